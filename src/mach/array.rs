use super::Val;
use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

pub const MAX_DIMENSIONS: usize = 4;
const MAX_ELEMENTS: usize = 1 << 24;

/// ## Multi-dimensional array with inclusive upper bounds

#[derive(Debug, Clone)]
pub struct Array {
    bounds: Vec<usize>,
    elements: Vec<Val>,
}

impl Array {
    pub fn new(bounds: Vec<usize>, zero: Val) -> Result<Array> {
        if bounds.is_empty() || bounds.len() > MAX_DIMENSIONS {
            return Err(error!(BadSubscript; "ARRAYS HAVE ONE TO FOUR DIMENSIONS"));
        }
        let mut size: usize = 1;
        for bound in &bounds {
            size = match size.checked_mul(bound + 1) {
                Some(size) if size <= MAX_ELEMENTS => size,
                _ => return Err(error!(IllegalQuantity; "ARRAY TOO LARGE")),
            };
        }
        Ok(Array {
            bounds,
            elements: vec![zero; size],
        })
    }

    pub fn bounds(&self) -> &[usize] {
        &self.bounds
    }

    /// Flat offset of an index list. Missing trailing indices are zero;
    /// any index past the declared rank must be zero.
    pub fn offset(&self, index: &[usize]) -> Result<usize> {
        if index.len() > MAX_DIMENSIONS {
            return Err(error!(BadSubscript));
        }
        let mut offset = 0;
        let mut block = 1;
        for (dim, &ix) in index.iter().enumerate() {
            match self.bounds.get(dim) {
                Some(&bound) => {
                    if ix > bound {
                        return Err(error!(BadSubscript));
                    }
                    offset += ix * block;
                    block *= bound + 1;
                }
                None => {
                    if ix > 0 {
                        return Err(error!(BadSubscript));
                    }
                }
            }
        }
        Ok(offset)
    }

    pub fn get(&self, offset: usize) -> Result<&Val> {
        self.elements
            .get(offset)
            .ok_or_else(|| error!(Internal; "ARRAY OFFSET"))
    }

    pub fn set(&mut self, offset: usize, val: Val) -> Result<()> {
        match self.elements.get_mut(offset) {
            Some(slot) => {
                *slot = val;
                Ok(())
            }
            None => Err(error!(Internal; "ARRAY OFFSET")),
        }
    }

    pub fn elements(&self) -> &[Val] {
        &self.elements
    }
}
