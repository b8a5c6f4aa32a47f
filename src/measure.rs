use crate::layout::NodeKind;

/// Fixed box geometry for table and enum nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeMetrics {
    pub header_height: f64,
    pub row_height: f64,
    pub padding: f64,
    pub table_width: f64,
    pub enum_width: f64,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            header_height: 32.0,
            row_height: 24.0,
            padding: 12.0,
            table_width: 240.0,
            enum_width: 180.0,
        }
    }
}

impl NodeMetrics {
    pub fn node_width(&self, kind: NodeKind) -> f64 {
        match kind {
            NodeKind::Table => self.table_width,
            NodeKind::Enum => self.enum_width,
        }
    }

    /// Header, one row per column or enum value, then bottom padding.
    pub fn node_height(&self, rows: usize) -> f64 {
        self.header_height + rows as f64 * self.row_height + self.padding
    }

    pub fn node_size(&self, kind: NodeKind, rows: usize) -> (f64, f64) {
        (self.node_width(kind), self.node_height(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_column_table() {
        let m = NodeMetrics::default();
        assert_eq!(m.node_size(NodeKind::Table, 5), (240.0, 164.0));
    }

    #[test]
    fn test_enum_width() {
        let m = NodeMetrics::default();
        assert_eq!(m.node_size(NodeKind::Enum, 2), (180.0, 92.0));
    }

    #[test]
    fn test_empty_node_keeps_header() {
        let m = NodeMetrics::default();
        assert_eq!(m.node_height(0), 44.0);
    }
}
