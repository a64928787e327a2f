use super::{Array, Val};
use crate::error;
use crate::lang::Error;
use std::collections::HashMap;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// ## Variable memory

#[derive(Debug, Default)]
pub struct Var {
    vars: HashMap<Rc<str>, Val>,
    arrays: HashMap<Rc<str>, Array>,
}

impl Var {
    pub fn new() -> Var {
        Var::default()
    }

    pub fn clear(&mut self) {
        self.vars.clear();
        self.arrays.clear();
    }

    pub fn fetch(&self, var_name: &str) -> Val {
        match self.vars.get(var_name) {
            Some(val) => val.clone(),
            None => Val::zero_for(var_name),
        }
    }

    /// Creates the variable with its zero value if it is new.
    pub fn touch(&mut self, var_name: &Rc<str>) {
        if !self.vars.contains_key(var_name) {
            self.vars.insert(var_name.clone(), Val::zero_for(var_name));
        }
    }

    pub fn store(&mut self, var_name: &Rc<str>, value: Val) -> Result<()> {
        let value = Val::coerce_for(var_name, value)?;
        match self.vars.get_mut(var_name) {
            Some(var) => *var = value,
            None => {
                self.vars.insert(var_name.clone(), value);
            }
        }
        Ok(())
    }

    /// Stores without the suffix conversion, for clock variables.
    pub fn store_raw(&mut self, var_name: &str, value: Val) {
        self.vars.insert(var_name.into(), value);
    }

    pub fn has_array(&self, var_name: &str) -> bool {
        self.arrays.contains_key(var_name)
    }

    pub fn dimension_array(&mut self, var_name: &Rc<str>, bounds: Vec<usize>) -> Result<()> {
        let array = Array::new(bounds, Val::zero_for(var_name))?;
        self.arrays.insert(var_name.clone(), array);
        Ok(())
    }

    pub fn array_offset(&self, var_name: &str, index: &[usize]) -> Result<usize> {
        match self.arrays.get(var_name) {
            Some(array) => array.offset(index),
            None => Err(error!(BadSubscript; "ARRAY NOT DIMENSIONED")),
        }
    }

    pub fn fetch_array(&self, var_name: &str, offset: usize) -> Result<Val> {
        match self.arrays.get(var_name) {
            Some(array) => array.get(offset).map(Val::clone),
            None => Err(error!(BadSubscript; "ARRAY NOT DIMENSIONED")),
        }
    }

    pub fn store_array(&mut self, var_name: &str, offset: usize, value: Val) -> Result<()> {
        let value = Val::coerce_for(var_name, value)?;
        match self.arrays.get_mut(var_name) {
            Some(array) => array.set(offset, value),
            None => Err(error!(BadSubscript; "ARRAY NOT DIMENSIONED")),
        }
    }

    /// Variables sorted by name.
    pub fn variables(&self) -> Vec<(&Rc<str>, &Val)> {
        let mut vars: Vec<_> = self.vars.iter().collect();
        vars.sort_by(|a, b| a.0.cmp(b.0));
        vars
    }

    /// Arrays sorted by name.
    pub fn arrays(&self) -> Vec<(&Rc<str>, &Array)> {
        let mut arrays: Vec<_> = self.arrays.iter().collect();
        arrays.sort_by(|a, b| a.0.cmp(b.0));
        arrays
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_defaults_by_suffix() {
        let var = Var::new();
        assert_eq!(var.fetch("A$"), Val::Text("".into()));
        assert_eq!(var.fetch("A%"), Val::Integer(0));
        assert_eq!(var.fetch("A"), Val::Real(0.0));
    }

    #[test]
    fn test_store_converts() {
        let mut var = Var::new();
        var.store(&"N%".into(), Val::Real(-2.9)).unwrap();
        assert_eq!(var.fetch("N%"), Val::Integer(-2));
        assert!(var.store(&"S$".into(), Val::Integer(1)).is_err());
    }

    #[test]
    fn test_array_store_and_bounds() {
        let mut var = Var::new();
        var.dimension_array(&"A".into(), vec![5]).unwrap();
        let offset = var.array_offset("A", &[5]).unwrap();
        var.store_array("A", offset, Val::Integer(42)).unwrap();
        assert_eq!(var.fetch_array("A", offset).unwrap(), Val::Real(42.0));
        assert!(var.array_offset("A", &[6]).is_err());
        assert!(var.array_offset("A", &[1, 1]).is_err());
    }
}
