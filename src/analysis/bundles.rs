//! Product co-occurrence ("bundle") counting.
//!
//! Only orders with two or more line items take part. Each such order
//! contributes one count to every unordered pair of distinct products it
//! contains. Counts keep first-seen order, which breaks ties in top-k
//! selection.

use indexmap::IndexMap;

use crate::models::{BundlePartner, CleanedRecord};

/// An unordered pair of distinct products, stored in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductPair {
    first: String,
    second: String,
}

impl ProductPair {
    /// Build a pair; `None` when both names are the same product.
    pub fn new(a: &str, b: &str) -> Option<Self> {
        match a.cmp(b) {
            std::cmp::Ordering::Less => Some(Self {
                first: a.to_string(),
                second: b.to_string(),
            }),
            std::cmp::Ordering::Greater => Some(Self {
                first: b.to_string(),
                second: a.to_string(),
            }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The member that is not `product`, if `product` is a member.
    pub fn other(&self, product: &str) -> Option<&str> {
        if self.first == product {
            Some(&self.second)
        } else if self.second == product {
            Some(&self.first)
        } else {
            None
        }
    }
}

/// Count product pairs across multi-item orders.
pub fn count_pairs(records: &[CleanedRecord]) -> IndexMap<ProductPair, usize> {
    // Line items and distinct products per order, in first-seen order
    let mut orders: IndexMap<&str, (usize, Vec<&str>)> = IndexMap::new();
    for record in records {
        let entry = orders.entry(record.order_id.as_str()).or_default();
        entry.0 += 1;
        if !entry.1.contains(&record.product.as_str()) {
            entry.1.push(record.product.as_str());
        }
    }

    let mut counts: IndexMap<ProductPair, usize> = IndexMap::new();
    for (line_items, products) in orders.values() {
        if *line_items < 2 {
            continue;
        }

        for (i, a) in products.iter().enumerate() {
            for b in &products[i + 1..] {
                if let Some(pair) = ProductPair::new(a, b) {
                    *counts.entry(pair).or_default() += 1;
                }
            }
        }
    }

    counts
}

/// Products most often bought with `reference`, highest count first.
///
/// Equal counts keep the order in which their pairs were first seen.
pub fn top_partners(
    counts: &IndexMap<ProductPair, usize>,
    reference: &str,
    limit: usize,
) -> Vec<BundlePartner> {
    let mut partners: Vec<BundlePartner> = counts
        .iter()
        .filter_map(|(pair, &orders)| {
            pair.other(reference).map(|other| BundlePartner {
                product: other.to_string(),
                orders,
            })
        })
        .collect();

    partners.sort_by_key(|partner| std::cmp::Reverse(partner.orders));
    partners.truncate(limit);
    partners
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearMonth;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn item(order_id: &str, product: &str) -> CleanedRecord {
        let order_date = NaiveDate::from_ymd_opt(2019, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        CleanedRecord {
            order_id: order_id.to_string(),
            product: product.to_string(),
            quantity: 1,
            price_each: Decimal::ONE,
            order_date,
            purchase_address: "1 Main St, Dallas, TX 75001, USA".to_string(),
            period: YearMonth::of(&order_date),
            month: 3,
            city: "Dallas (TX)".to_string(),
            sales: Decimal::ONE,
        }
    }

    fn pair(a: &str, b: &str) -> ProductPair {
        ProductPair::new(a, b).unwrap()
    }

    #[test]
    fn test_pair_is_unordered() {
        assert_eq!(pair("A", "B"), pair("B", "A"));
        assert!(ProductPair::new("A", "A").is_none());
        assert_eq!(pair("A", "B").other("A"), Some("B"));
        assert_eq!(pair("A", "B").other("C"), None);
    }

    #[test]
    fn test_single_item_orders_do_not_contribute() {
        let records = vec![
            item("O1", "A"),
            item("O1", "B"),
            item("O2", "A"),
            item("O2", "C"),
            item("O3", "A"),
        ];

        let counts = count_pairs(&records);

        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get(&pair("A", "B")), Some(&1));
        assert_eq!(counts.get(&pair("A", "C")), Some(&1));
    }

    #[test]
    fn test_repeated_product_in_order_has_no_self_pair() {
        let records = vec![item("O1", "A"), item("O1", "A")];
        assert!(count_pairs(&records).is_empty());
    }

    #[test]
    fn test_order_with_three_products() {
        let records = vec![item("O1", "A"), item("O1", "B"), item("O1", "C")];
        let counts = count_pairs(&records);
        assert_eq!(counts.len(), 3);
        assert_eq!(counts.get(&pair("B", "C")), Some(&1));
    }

    #[test]
    fn test_top_partners_ranking_and_ties() {
        let records = vec![
            item("O1", "Ref"),
            item("O1", "X"),
            item("O2", "Ref"),
            item("O2", "Y"),
            item("O3", "Y"),
            item("O3", "Ref"),
            item("O4", "Z"),
            item("O4", "Ref"),
            item("O5", "Q"),
            item("O5", "W"),
        ];

        let counts = count_pairs(&records);
        let top = top_partners(&counts, "Ref", 5);
        let names: Vec<_> = top.iter().map(|p| p.product.as_str()).collect();

        assert_eq!(names, vec!["Y", "X", "Z"]);
        assert_eq!(top[0].orders, 2);

        let limited = top_partners(&counts, "Ref", 2);
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[1].product, "X");
    }
}
