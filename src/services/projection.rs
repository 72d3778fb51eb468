//! Grouping and filtering of the store into a per-table view.
//!
//! [`project`] is a pure function of its inputs, so it can be re-run on
//! every filter keystroke without touching the store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Notification, TableNo};

/// Read-side filter criteria. An empty string places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive exact match against the table key
    #[serde(default)]
    pub table_filter: String,
    /// Case-insensitive substring match against the message
    #[serde(default)]
    pub text_filter: String,
}

impl FilterCriteria {
    pub fn new(table_filter: impl Into<String>, text_filter: impl Into<String>) -> Self {
        Self {
            table_filter: table_filter.into(),
            text_filter: text_filter.into(),
        }
    }

    pub fn table(table_filter: impl Into<String>) -> Self {
        Self::new(table_filter, "")
    }

    pub fn text(text_filter: impl Into<String>) -> Self {
        Self::new("", text_filter)
    }

    pub fn is_unconstrained(&self) -> bool {
        self.table_filter.is_empty() && self.text_filter.is_empty()
    }
}

/// All surviving notifications of one table, in store order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableGroup<'a> {
    #[serde(rename = "table")]
    pub key: String,
    /// Table number as first seen; `5` and `"5"` share a group
    #[serde(skip)]
    pub label: &'a TableNo,
    #[serde(rename = "notifications")]
    pub entries: Vec<&'a Notification>,
}

impl TableGroup<'_> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Filtered notifications grouped by table.
///
/// Groups are ordered by the first appearance of their table in the store,
/// which puts the table with the most recent activity first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GroupedView<'a> {
    groups: Vec<TableGroup<'a>>,
}

impl<'a> GroupedView<'a> {
    pub fn groups(&self) -> &[TableGroup<'a>] {
        &self.groups
    }

    pub fn get(&self, key: &str) -> Option<&TableGroup<'a>> {
        self.groups.iter().find(|group| group.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.key.as_str())
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Number of notifications across all groups
    pub fn total(&self) -> usize {
        self.groups.iter().map(TableGroup::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Group `items` by table, keeping only those that pass `criteria`.
///
/// A table filter that does not match excludes the whole table. The text
/// filter is then applied per notification. Groups are only created for
/// admitted notifications, so a table whose every message was filtered out
/// does not appear at all.
pub fn project<'a, I>(items: I, criteria: &FilterCriteria) -> GroupedView<'a>
where
    I: IntoIterator<Item = &'a Notification>,
{
    let table_filter = criteria.table_filter.to_lowercase();
    let text_filter = criteria.text_filter.to_lowercase();

    let mut groups: Vec<TableGroup<'a>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let key = item.table_no.key();

        if !table_filter.is_empty() && key.to_lowercase() != table_filter {
            continue;
        }
        if !text_filter.is_empty() && !item.message.to_lowercase().contains(&text_filter) {
            continue;
        }

        match index.get(&key) {
            Some(&position) => groups[position].entries.push(item),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(TableGroup {
                    key,
                    label: &item.table_no,
                    entries: vec![item],
                });
            }
        }
    }

    GroupedView { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawNotification;
    use crate::services::store::NotificationStore;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    fn notification(table: impl Into<TableNo>, message: &str) -> Notification {
        Notification::new(table, message)
    }

    fn messages<'a>(group: &TableGroup<'a>) -> Vec<&'a str> {
        group.entries.iter().map(|n| n.message.as_str()).collect()
    }

    // ========================================================================
    // Property-based tests
    // ========================================================================

    fn arb_notification() -> impl Strategy<Value = Notification> {
        (
            prop_oneof![
                (0i64..8).prop_map(TableNo::from),
                "[a-cA-C0-9]{1,2}".prop_map(|s| TableNo::Text(s)),
            ],
            "[a-zA-Z ]{0,16}",
        )
            .prop_map(|(table_no, message)| Notification::new(table_no, message))
    }

    fn arb_criteria() -> impl Strategy<Value = FilterCriteria> {
        ("[a-cA-C0-9]{0,2}", "[a-zA-Z]{0,3}")
            .prop_map(|(table, text)| FilterCriteria::new(table, text))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_project_is_deterministic(
            items in proptest::collection::vec(arb_notification(), 0..40),
            criteria in arb_criteria(),
        ) {
            let same = criteria.clone();
            prop_assert_eq!(project(&items, &criteria), project(&items, &same));
        }

        #[test]
        fn prop_project_never_yields_empty_groups(
            items in proptest::collection::vec(arb_notification(), 0..40),
            criteria in arb_criteria(),
        ) {
            let view = project(&items, &criteria);
            prop_assert!(view.groups().iter().all(|group| !group.is_empty()));
        }

        #[test]
        fn prop_unconstrained_view_keeps_every_item_in_order(
            items in proptest::collection::vec(arb_notification(), 0..40),
        ) {
            let view = project(&items, &FilterCriteria::default());
            prop_assert_eq!(view.total(), items.len());

            for group in view.groups() {
                let expected: Vec<&Notification> = items
                    .iter()
                    .filter(|n| n.table_no.key() == group.key)
                    .collect();
                prop_assert_eq!(&group.entries, &expected);
            }
        }

        #[test]
        fn prop_every_admitted_item_passes_both_filters(
            items in proptest::collection::vec(arb_notification(), 0..40),
            criteria in arb_criteria(),
        ) {
            let view = project(&items, &criteria);
            for group in view.groups() {
                for entry in &group.entries {
                    if !criteria.table_filter.is_empty() {
                        prop_assert!(entry.table_no.matches(&criteria.table_filter));
                    }
                    prop_assert!(entry
                        .message
                        .to_lowercase()
                        .contains(&criteria.text_filter.to_lowercase()));
                }
            }
        }
    }

    // ========================================================================
    // Unit tests
    // ========================================================================

    #[test]
    fn test_empty_input_gives_empty_view() {
        let items: Vec<Notification> = Vec::new();
        let view = project(&items, &FilterCriteria::default());
        assert!(view.is_empty());
        assert_eq!(view.total(), 0);
    }

    #[test]
    fn test_table_filter_matches_number_and_string_forms() {
        let items = vec![
            notification(5, "numeric five"),
            notification("5", "string five"),
            notification(12, "twelve"),
        ];
        let view = project(&items, &FilterCriteria::table("5"));

        assert_eq!(view.keys().collect::<Vec<_>>(), vec!["5"]);
        let group = view.get("5").unwrap();
        assert_eq!(messages(group), vec!["numeric five", "string five"]);
        assert!(view.get("12").is_none());
    }

    #[test]
    fn test_integral_float_table_joins_integer_group() {
        let items: Vec<Notification> = [json!(5), json!(5.0), json!("5")]
            .into_iter()
            .map(|table| {
                RawNotification::new(table, "order").validate().unwrap()
            })
            .collect();

        let view = project(&items, &FilterCriteria::default());
        assert_eq!(view.keys().collect::<Vec<_>>(), vec!["5"]);
        assert_eq!(project(&items, &FilterCriteria::table("5")).total(), 3);
    }

    #[test]
    fn test_table_filter_is_case_insensitive_exact() {
        let items = vec![
            notification("Patio", "a"),
            notification("Patio2", "b"),
            notification("bar", "c"),
        ];
        let view = project(&items, &FilterCriteria::table("PATIO"));
        assert_eq!(view.keys().collect::<Vec<_>>(), vec!["Patio"]);
    }

    #[test]
    fn test_text_filter_drops_groups_that_become_empty() {
        let items = vec![
            notification(1, "Two coffees please"),
            notification(2, "Bill please"),
            notification(1, "More water"),
            notification(3, "COFFEE refill"),
        ];
        let view = project(&items, &FilterCriteria::text("coffee"));

        assert_eq!(view.keys().collect::<Vec<_>>(), vec!["1", "3"]);
        assert_eq!(messages(view.get("1").unwrap()), vec!["Two coffees please"]);
        assert!(view.get("2").is_none());
    }

    #[test]
    fn test_both_filters_combine() {
        let items = vec![
            notification(1, "coffee"),
            notification(2, "coffee"),
            notification(1, "tea"),
        ];
        let view = project(&items, &FilterCriteria::new("1", "COF"));
        assert_eq!(view.total(), 1);
        assert_eq!(messages(view.get("1").unwrap()), vec!["coffee"]);
    }

    #[test]
    fn test_groups_follow_first_appearance() {
        let items = vec![
            notification(7, "a"),
            notification(2, "b"),
            notification(7, "c"),
            notification(10, "d"),
        ];
        let view = project(&items, &FilterCriteria::default());
        assert_eq!(view.keys().collect::<Vec<_>>(), vec!["7", "2", "10"]);
        assert_eq!(view.len(), 3);
        assert_eq!(view.total(), 4);
    }

    #[test]
    fn test_backlog_then_events_scenario() {
        let mut store = NotificationStore::default();
        store.replace_all(vec![
            RawNotification::new(1, "Order A").with_timestamp("2024-06-01T12:00:01Z"),
        ]);
        store
            .prepend(RawNotification::new(2, "Order B").with_timestamp("2024-06-01T12:00:02Z"))
            .unwrap();
        store
            .prepend(RawNotification::new(1, "Order C").with_timestamp("2024-06-01T12:00:03Z"))
            .unwrap();

        let view = project(store.snapshot(), &FilterCriteria::default());
        assert_eq!(view.keys().collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(messages(view.get("1").unwrap()), vec!["Order C", "Order A"]);
        assert_eq!(messages(view.get("2").unwrap()), vec!["Order B"]);
    }

    #[test]
    fn test_malformed_event_never_reaches_view() {
        let mut store = NotificationStore::default();
        store.replace_all(vec![RawNotification::new(1, "Order A")]);
        let malformed: RawNotification =
            serde_json::from_value(json!({"tableNo": 3})).unwrap();

        assert!(store.prepend(malformed).is_err());
        assert_eq!(store.len(), 1);
        let view = project(store.snapshot(), &FilterCriteria::default());
        assert!(view.get("3").is_none());
    }

    #[test]
    fn test_view_serializes_as_table_list() {
        let items = vec![notification(4, "Napkins")];
        let view = project(&items, &FilterCriteria::default());
        let value = serde_json::to_value(&view).unwrap();

        assert_eq!(value[0]["table"], json!("4"));
        assert_eq!(value[0]["notifications"][0]["message"], json!("Napkins"));
        assert_eq!(value[0]["notifications"][0]["tableNo"], Value::from(4));
    }
}
