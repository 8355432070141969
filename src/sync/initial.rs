use super::FieldScheme;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InitialRow {
    pub selector: Option<String>,
    pub aux: BTreeMap<String, String>,
}

impl InitialRow {
    pub fn new(selector: Option<&str>, aux: &[(&str, &str)]) -> Self {
        Self {
            selector: selector.map(str::to_string),
            aux: aux
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Saved row values keyed by row index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InitialValues {
    pub rows: BTreeMap<usize, InitialRow>,
}

impl InitialValues {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn field_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<prefix>.+)_(?P<index>\d+)$").expect("valid field id pattern"))
}

/// Parse a saved `<prefix>_<index> -> value` map. Unknown prefixes and
/// indices outside `0..capacity` are skipped.
pub fn parse_initial(
    scheme: &FieldScheme,
    capacity: usize,
    values: &BTreeMap<String, String>,
) -> InitialValues {
    let mut out = InitialValues::default();
    for (id, value) in values {
        let Some(caps) = field_id_re().captures(id) else {
            log::warn!("initial value '{id}' has no row index, skipped");
            continue;
        };
        let prefix = &caps["prefix"];
        let Ok(index) = caps["index"].parse::<usize>() else {
            log::warn!("initial value '{id}' has an unreadable row index, skipped");
            continue;
        };
        if index >= capacity {
            log::warn!("initial value '{id}' outside {capacity} rows, skipped");
            continue;
        }
        if prefix == scheme.selector_prefix {
            let row = out.rows.entry(index).or_default();
            row.selector = Some(value.clone()).filter(|v| !v.is_empty());
        } else if let Some(aux) = scheme.aux.iter().find(|a| a.prefix == prefix) {
            let row = out.rows.entry(index).or_default();
            row.aux.insert(aux.name.clone(), value.clone());
        } else {
            log::warn!("initial value '{id}' matches no configured field, skipped");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::AuxPrefix;

    fn scheme() -> FieldScheme {
        FieldScheme {
            selector_prefix: "id_search_field".into(),
            aux: vec![
                AuxPrefix {
                    name: "row".into(),
                    prefix: "id_row_field".into(),
                },
                AuxPrefix {
                    name: "column".into(),
                    prefix: "id_column_field".into(),
                },
            ],
        }
    }

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_selector_and_aux_by_prefix() {
        let got = parse_initial(
            &scheme(),
            20,
            &map(&[
                ("id_search_field_0", "3"),
                ("id_row_field_0", "1"),
                ("id_column_field_12", "4"),
            ]),
        );
        assert_eq!(got.rows[&0].selector.as_deref(), Some("3"));
        assert_eq!(got.rows[&0].aux["row"], "1");
        assert_eq!(got.rows[&12].aux["column"], "4");
        assert!(got.rows[&12].selector.is_none());
    }

    #[test]
    fn skips_malformed_and_out_of_range_ids() {
        let got = parse_initial(
            &scheme(),
            5,
            &map(&[
                ("id_search_field", "1"),
                ("id_search_field_x", "1"),
                ("id_search_field_5", "1"),
                ("id_size_field_0", "6"),
                ("id_search_field_99999999999999999999999", "1"),
            ]),
        );
        assert!(got.is_empty());
    }

    #[test]
    fn empty_selector_reads_as_unset() {
        let got = parse_initial(&scheme(), 3, &map(&[("id_search_field_1", "")]));
        assert_eq!(got.rows[&1].selector, None);
    }
}
