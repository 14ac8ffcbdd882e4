//! Layout selection and label arrangement within the panel slot

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two displayable fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The date label
    Date,
    /// The time label
    Time,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Date => f.write_str("date"),
            Field::Time => f.write_str("time"),
        }
    }
}

/// Which fields are shown as labels and in what order
///
/// The integer values are the persisted representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layout {
    /// Date label only, time in the tooltip
    Date,
    /// Time label only, date in the tooltip
    Time,
    /// Date label above the time label
    #[default]
    DateTime,
    /// Time label above the date label
    TimeDate,
}

impl Layout {
    /// Every layout, ordered by persisted value
    pub const ALL: [Layout; 4] = [
        Layout::Date,
        Layout::Time,
        Layout::DateTime,
        Layout::TimeDate,
    ];

    /// Persisted integer value
    pub fn as_index(self) -> i64 {
        match self {
            Layout::Date => 0,
            Layout::Time => 1,
            Layout::DateTime => 2,
            Layout::TimeDate => 3,
        }
    }

    /// Layout for a persisted integer, `None` when out of range
    pub fn from_index(index: i64) -> Option<Self> {
        Self::ALL.get(usize::try_from(index).ok()?).copied()
    }

    /// Label fields in display order
    pub fn label_fields(self) -> &'static [Field] {
        match self {
            Layout::Date => &[Field::Date],
            Layout::Time => &[Field::Time],
            Layout::DateTime => &[Field::Date, Field::Time],
            Layout::TimeDate => &[Field::Time, Field::Date],
        }
    }

    /// Whether `field` is shown as a label under this layout
    pub fn shows_label(self, field: Field) -> bool {
        self.label_fields().contains(&field)
    }

    /// Field deferred to the tooltip, if any
    pub fn tooltip_field(self) -> Option<Field> {
        match self {
            Layout::Date => Some(Field::Time),
            Layout::Time => Some(Field::Date),
            Layout::DateTime | Layout::TimeDate => None,
        }
    }
}

impl TryFrom<i64> for Layout {
    type Error = i64;

    fn try_from(index: i64) -> Result<Self, Self::Error> {
        Layout::from_index(index).ok_or(index)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layout::Date => "date",
            Layout::Time => "time",
            Layout::DateTime => "date-time",
            Layout::TimeDate => "time-date",
        };
        f.write_str(name)
    }
}

// Serialize as the persisted integer
impl Serialize for Layout {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.as_index())
    }
}

// Out-of-range values keep the default layout rather than failing the whole file
impl<'de> Deserialize<'de> for Layout {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let index = i64::deserialize(deserializer)?;
        Ok(Layout::from_index(index).unwrap_or_else(|| {
            tracing::warn!(layout = index, "Ignoring out-of-range layout value");
            Layout::default()
        }))
    }
}

/// Placement of one label inside the slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPosition {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Stacks label boxes top to bottom inside the slot, each centred horizontally
pub struct LabelLayout {
    padding: f32,
    spacing: f32,
}

impl LabelLayout {
    pub fn new() -> Self {
        Self {
            padding: 4.0,
            spacing: 2.0,
        }
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Total size needed for labels of the given `(width, height)` extents
    pub fn content_size(&self, extents: &[(f32, f32)]) -> (f32, f32) {
        if extents.is_empty() {
            return (self.padding * 2.0, self.padding * 2.0);
        }

        let gaps = self.spacing * (extents.len() - 1) as f32;
        let width = extents.iter().map(|e| e.0).fold(0.0, f32::max);
        let height = extents.iter().map(|e| e.1).sum::<f32>() + gaps;

        (width + self.padding * 2.0, height + self.padding * 2.0)
    }

    /// Positions for labels of the given extents inside a `container` box.
    ///
    /// The stack as a whole is centred vertically.
    pub fn positions(&self, container: (f32, f32), extents: &[(f32, f32)]) -> Vec<LabelPosition> {
        let (_, content_h) = self.content_size(extents);
        let mut positions = Vec::with_capacity(extents.len());

        let mut y = ((container.1 - content_h) / 2.0).max(0.0) + self.padding;
        for &(width, height) in extents {
            positions.push(LabelPosition {
                x: ((container.0 - width) / 2.0).max(0.0),
                y,
                width,
                height,
            });
            y += height + self.spacing;
        }

        positions
    }
}

impl Default for LabelLayout {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_indices() {
        for layout in Layout::ALL {
            assert_eq!(Layout::from_index(layout.as_index()), Some(layout));
        }
        assert_eq!(Layout::from_index(-1), None);
        assert_eq!(Layout::from_index(4), None);
        assert_eq!(Layout::try_from(7), Err(7));
    }

    #[test]
    fn test_default_is_date_then_time() {
        assert_eq!(Layout::default(), Layout::DateTime);
        assert_eq!(Layout::default().label_fields(), &[Field::Date, Field::Time]);
    }

    #[test]
    fn test_single_field_layouts_defer_to_tooltip() {
        assert_eq!(Layout::Date.tooltip_field(), Some(Field::Time));
        assert_eq!(Layout::Time.tooltip_field(), Some(Field::Date));
        assert!(!Layout::Date.shows_label(Field::Time));
        assert!(!Layout::Time.shows_label(Field::Date));
        assert_eq!(Layout::DateTime.tooltip_field(), None);
        assert_eq!(Layout::TimeDate.tooltip_field(), None);
    }

    #[test]
    fn test_layout_deserialize_out_of_range() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            layout: Layout,
        }

        let ok: Wrapper = toml::from_str("layout = 3").unwrap();
        assert_eq!(ok.layout, Layout::TimeDate);

        let bad: Wrapper = toml::from_str("layout = 9").unwrap();
        assert_eq!(bad.layout, Layout::default());
    }

    #[test]
    fn test_label_stacking() {
        let layout = LabelLayout::new().with_padding(2.0).with_spacing(1.0);

        assert_eq!(layout.content_size(&[(60.0, 10.0), (40.0, 12.0)]), (64.0, 27.0));

        let positions = layout.positions((64.0, 27.0), &[(60.0, 10.0), (40.0, 12.0)]);
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].y, 2.0);
        assert_eq!(positions[1].y, 13.0); // 2 + 10 + 1
        assert_eq!(positions[1].x, 12.0); // (64 - 40) / 2
    }

    #[test]
    fn test_stack_centred_in_taller_slot() {
        let layout = LabelLayout::new().with_padding(0.0).with_spacing(0.0);

        let positions = layout.positions((30.0, 40.0), &[(30.0, 10.0)]);
        assert_eq!(positions[0].y, 15.0);
        assert_eq!(positions[0].x, 0.0);
    }

    #[test]
    fn test_empty_content() {
        let layout = LabelLayout::new().with_padding(3.0);
        assert_eq!(layout.content_size(&[]), (6.0, 6.0));
        assert!(layout.positions((10.0, 10.0), &[]).is_empty());
    }
}
