use anyhow::{anyhow, Result};

use docchat_core::types::NodeId;

#[derive(Debug, Clone)]
pub struct VectorRow {
    pub id: NodeId,
    pub vector: Vec<f32>,
}

/// Append-only row store with a fixed dimension set by the first insert.
#[derive(Debug, Default)]
pub struct VectorTable {
    dim: Option<usize>,
    rows: Vec<VectorRow>,
}

impl VectorTable {
    pub fn new() -> Self { Self::default() }

    pub fn dim(&self) -> Option<usize> { self.dim }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn insert(&mut self, id: NodeId, vector: Vec<f32>) -> Result<()> {
        match self.dim {
            Some(d) if d != vector.len() => {
                return Err(anyhow!("vector for '{}' has dim {}, table expects {}", id, vector.len(), d));
            }
            Some(_) => {}
            None => self.dim = Some(vector.len()),
        }
        self.rows.push(VectorRow { id, vector });
        Ok(())
    }

    pub fn rows(&self) -> &[VectorRow] { &self.rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_is_fixed_by_first_row() {
        let mut t = VectorTable::new();
        t.insert("a".into(), vec![1.0, 0.0]).expect("first row");
        assert_eq!(t.dim(), Some(2));
        assert!(t.insert("b".into(), vec![1.0, 0.0, 0.0]).is_err());
        assert_eq!(t.len(), 1);
    }
}
