//! Fixed product catalogue used for synthetic receipts.

/// Items grouped by category.
pub const ITEMS_BY_CATEGORY: &[(&str, &[&str])] = &[
    (
        "household chemicals",
        &[
            "Washing powder",
            "Laundry gel",
            "Dishwashing liquid",
            "Bathroom cleaner",
            "All-purpose cleaner",
        ],
    ),
    (
        "textile",
        &[
            "Terry towel",
            "Bed linen set",
            "Tablecloth",
            "Fleece blanket",
        ],
    ),
    (
        "kitchenware",
        &[
            "Frying pan",
            "Saucepan",
            "Cutting board",
            "Kitchen knife",
            "Cutlery set",
        ],
    ),
    (
        "home goods",
        &[
            "Bucket",
            "Storage container",
            "Laundry basket",
            "Clothes hangers",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_items() {
        assert!(!ITEMS_BY_CATEGORY.is_empty());
        for (category, items) in ITEMS_BY_CATEGORY {
            assert!(!items.is_empty(), "{category} has no items");
        }
    }
}
