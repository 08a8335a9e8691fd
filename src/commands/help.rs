pub fn execute() -> String {
    [
        "📖 basket-compare commands",
        "",
        "🛒 Shopping list",
        "  add <product>        Add a catalog product (name, id or barcode)",
        "  remove <product>     Remove a product (name, id, barcode or #)",
        "  list                 Show the shopping list",
        "  catalog [filter]     Show catalog products, optionally filtered",
        "  catalog reload       Load the catalog again",
        "",
        "📈 Price history",
        "  chart <product>      Turn the price chart for a product on or off",
        "  refresh <product>    Fetch a charted product's history again",
        "  plot [file.png]      Write the price chart to a PNG file",
        "",
        "🏪 Stores",
        "  cheapest             Compare the list across stores",
        "  stores               Show the last comparison",
        "  select <#>           Center the map on a store from the comparison",
        "  map                  Show the current map center",
        "",
        "  help                 Show this help message",
        "  quit                 Leave",
    ]
    .join("\n")
}
