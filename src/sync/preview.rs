use super::{FormState, RowSlot};

pub const DEFAULT_PLACEHOLDER: &str = "image_string";
/// Width of the layout grid, in columns.
pub const GRID_COLUMNS: u16 = 12;

const SLOT_SEPARATOR: char = ',';
const FIELD_SEPARATOR: char = '~';

/// URL template with a single placeholder that receives the encoded rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewTemplate {
    template: String,
    placeholder: String,
}

impl PreviewTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self::with_placeholder(template, DEFAULT_PLACEHOLDER)
    }

    pub fn with_placeholder(template: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            placeholder: placeholder.into(),
        }
    }

    pub fn placeholder_count(&self) -> usize {
        if self.placeholder.is_empty() {
            return 0;
        }
        self.template.matches(self.placeholder.as_str()).count()
    }

    /// Replace the first placeholder with every slot's encoding. A template
    /// without the placeholder comes back unchanged.
    pub fn encode(&self, state: &FormState) -> String {
        if self.placeholder.is_empty() {
            return self.template.clone();
        }
        self.template
            .replacen(self.placeholder.as_str(), &encode_payload(state), 1)
    }

    /// Recover the payload from a URL produced by [`PreviewTemplate::encode`].
    pub fn extract_payload<'a>(&self, url: &'a str) -> Option<&'a str> {
        if self.placeholder.is_empty() {
            return None;
        }
        let (prefix, suffix) = self.template.split_once(self.placeholder.as_str())?;
        url.strip_prefix(prefix)?.strip_suffix(suffix)
    }
}

pub fn encode_slot(slot: &RowSlot) -> String {
    let mut out = slot.aux.join("~");
    out.push(FIELD_SEPARATOR);
    out.push_str(slot.selector.as_deref().unwrap_or(""));
    out
}

pub fn encode_payload(state: &FormState) -> String {
    state
        .rows()
        .iter()
        .map(encode_slot)
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedSlot {
    pub aux: Vec<String>,
    pub selector: String,
}

/// Decode a payload back into complete slots. Slots with a missing or empty
/// part are skipped.
pub fn decode_payload(payload: &str, aux_count: usize) -> Vec<DecodedSlot> {
    payload
        .split(SLOT_SEPARATOR)
        .filter_map(|slot| {
            let mut parts: Vec<String> = slot.split(FIELD_SEPARATOR).map(str::to_string).collect();
            if parts.len() != aux_count + 1 || parts.iter().any(String::is_empty) {
                return None;
            }
            let selector = parts.pop()?;
            Some(DecodedSlot {
                aux: parts,
                selector,
            })
        })
        .collect()
}

/// A decoded slot positioned on the layout grid. `row` and `col` are
/// 1-based; `size` counts grid columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub row: u16,
    pub col: u16,
    pub size: u16,
    pub selector: String,
}

impl Placement {
    pub fn from_slot(slot: &DecodedSlot, aux_names: &[String]) -> Option<Self> {
        let get = |name: &str| -> Option<u16> {
            let pos = aux_names.iter().position(|n| n == name)?;
            let v: u16 = slot.aux.get(pos)?.trim().parse().ok()?;
            (v > 0).then_some(v)
        };
        Some(Self {
            row: get("row")?,
            col: get("column")?,
            size: get("size")?,
            selector: slot.selector.clone(),
        })
    }

    /// Column span clipped to the grid.
    pub fn span(&self) -> u16 {
        if self.col > GRID_COLUMNS {
            return 0;
        }
        self.size.min(GRID_COLUMNS - self.col + 1)
    }
}

/// Whether the aux field set can be laid out on the grid.
pub fn supports_layout(aux_names: &[String]) -> bool {
    ["row", "column", "size"]
        .iter()
        .all(|want| aux_names.iter().any(|n| n == want))
}

pub fn placements(payload: &str, aux_names: &[String]) -> Vec<Placement> {
    decode_payload(payload, aux_names.len())
        .iter()
        .filter_map(|slot| Placement::from_slot(slot, aux_names))
        .collect()
}

pub fn highest_row(placements: &[Placement]) -> u16 {
    placements.iter().map(|p| p.row).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::initial::{InitialRow, InitialValues};
    use crate::sync::surface::Screen;
    use crate::sync::RowSynchronizer;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn three_slot_state() -> FormState {
        let mut initial = InitialValues::default();
        initial.rows.insert(
            0,
            InitialRow::new(Some("A"), &[("row", "1"), ("column", "2")]),
        );
        let sync = RowSynchronizer::initialize(
            3,
            names(&["row", "column"]),
            PreviewTemplate::new("img_image_string.png"),
            initial,
            Screen::new(3),
        );
        sync.state().clone()
    }

    #[test]
    fn encodes_every_slot_including_empty_ones() {
        let state = three_slot_state();
        let t = PreviewTemplate::new("img_image_string.png");
        assert_eq!(t.encode(&state), "img_1~2~A,~~,~~.png");
    }

    #[test]
    fn missing_placeholder_leaves_template_unchanged() {
        let state = three_slot_state();
        let t = PreviewTemplate::new("/preview/static.png");
        assert_eq!(t.placeholder_count(), 0);
        assert_eq!(t.encode(&state), "/preview/static.png");
    }

    #[test]
    fn only_first_placeholder_is_replaced() {
        let state = three_slot_state();
        let t = PreviewTemplate::new("image_string/image_string");
        assert_eq!(t.placeholder_count(), 2);
        assert_eq!(t.encode(&state), "1~2~A,~~,~~/image_string");
    }

    #[test]
    fn extract_payload_strips_template_affixes() {
        let t = PreviewTemplate::new("/preview/image_string/");
        assert_eq!(t.extract_payload("/preview/1~2~A,~~/"), Some("1~2~A,~~"));
        assert_eq!(t.extract_payload("/other/1~2~A/"), None);
        let bare = PreviewTemplate::new("no-token");
        assert_eq!(bare.extract_payload("no-token"), None);
    }

    #[test]
    fn decode_skips_incomplete_slots() {
        let slots = decode_payload("1~1~6~7,~~~,2~~6~8,3~1~12~9,1~2~x", 3);
        assert_eq!(
            slots,
            vec![
                DecodedSlot {
                    aux: names(&["1", "1", "6"]),
                    selector: "7".into()
                },
                DecodedSlot {
                    aux: names(&["3", "1", "12"]),
                    selector: "9".into()
                },
            ]
        );
    }

    #[test]
    fn placements_need_numeric_positive_values() {
        let aux = names(&["row", "column", "size"]);
        let got = placements("1~1~6~a,1~7~6~b,x~1~1~c,2~0~3~d", &aux);
        assert_eq!(got.len(), 2);
        assert_eq!(got[1].col, 7);
        assert_eq!(highest_row(&got), 1);
        assert!(supports_layout(&aux));
        assert!(!supports_layout(&names(&["result"])));
    }

    #[test]
    fn span_is_clipped_to_grid() {
        let p = Placement {
            row: 1,
            col: 10,
            size: 6,
            selector: "a".into(),
        };
        assert_eq!(p.span(), 3);
        let off = Placement { col: 13, ..p };
        assert_eq!(off.span(), 0);
    }
}
