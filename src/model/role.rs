//! Columns, roles, item data and flags of the tree-table

/// The three columns of the object table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Key, element position or object number the node appears under
    Object,
    /// Type label of the wrapped object
    Type,
    /// Value summary; the only editable column
    Value,
}

impl Column {
    pub const COUNT: usize = 3;

    pub fn from_index(column: usize) -> Option<Self> {
        match column {
            0 => Some(Column::Object),
            1 => Some(Column::Type),
            2 => Some(Column::Value),
            _ => None,
        }
    }

    pub fn to_index(self) -> usize {
        match self {
            Column::Object => 0,
            Column::Type => 1,
            Column::Value => 2,
        }
    }

    /// Header label
    pub fn title(self) -> &'static str {
        match self {
            Column::Object => "Object",
            Column::Type => "Type",
            Column::Value => "Value",
        }
    }
}

/// Purpose of a data query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRole {
    /// Text shown in the cell
    Display,
    /// Icon shown next to the text
    Decoration,
    /// Text an editor starts from
    Edit,
    /// Hover text
    ToolTip,
}

/// Value returned for a cell query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ItemData {
    /// No data for this cell and role
    #[default]
    None,
    Text(String),
    /// Icon resource name
    Icon(&'static str),
}

impl ItemData {
    pub fn is_none(&self) -> bool {
        matches!(self, ItemData::None)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ItemData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_icon(&self) -> Option<&'static str> {
        match self {
            ItemData::Icon(icon) => Some(icon),
            _ => None,
        }
    }
}

impl From<String> for ItemData {
    fn from(value: String) -> Self {
        ItemData::Text(value)
    }
}

impl From<&str> for ItemData {
    fn from(value: &str) -> Self {
        ItemData::Text(value.to_string())
    }
}

/// Header orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Flags indicating what operations are allowed on an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    pub enabled: bool,
    pub selectable: bool,
    pub editable: bool,
}

impl ItemFlags {
    /// Enabled and selectable
    pub fn new() -> Self {
        Self {
            enabled: true,
            selectable: true,
            editable: false,
        }
    }

    /// Enabled only; used for the invalid index
    pub fn enabled_only() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }
}
