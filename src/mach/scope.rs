use super::{ModuleId, ROOT_MODULE};

/// ## The variable-scope and code-scope module stacks
///
/// The code stack is never taller than the variable stack and never
/// more than one frame shorter.

#[derive(Debug, Clone)]
pub struct Scopes {
    variables: Vec<ModuleId>,
    code: Vec<ModuleId>,
}

impl Default for Scopes {
    fn default() -> Scopes {
        Scopes {
            variables: vec![ROOT_MODULE],
            code: vec![ROOT_MODULE],
        }
    }
}

impl Scopes {
    /// Module that unqualified identifiers address.
    pub fn variables(&self) -> ModuleId {
        *self.variables.last().unwrap_or(&ROOT_MODULE)
    }

    /// Module whose listing the program counter walks.
    pub fn code(&self) -> ModuleId {
        *self.code.last().unwrap_or(&ROOT_MODULE)
    }

    pub fn in_lockstep(&self) -> bool {
        self.variables.len() == self.code.len()
    }

    pub fn depth(&self) -> usize {
        self.variables.len()
    }

    /// MODULE: push a variable scope, or switch it when already one ahead.
    pub fn enter_variables(&mut self, id: ModuleId) {
        if self.in_lockstep() {
            self.variables.push(id);
        } else if let Some(top) = self.variables.last_mut() {
            *top = id;
        }
        self.check();
    }

    /// Catches the code stack up with the variable stack.
    /// Returns the module whose code was entered.
    pub fn enter_code(&mut self) -> Option<ModuleId> {
        if self.in_lockstep() {
            return None;
        }
        let id = self.variables();
        self.code.push(id);
        self.check();
        Some(id)
    }

    /// END: pops the current frame. Returns the module whose code
    /// stopped running, which is `None` when only a variable scope was left.
    pub fn end(&mut self) -> Option<ModuleId> {
        let mut stopped = None;
        if self.in_lockstep() {
            stopped = Some(self.code());
            if self.code.len() > 1 {
                self.code.pop();
            }
        }
        if self.variables.len() > 1 {
            self.variables.pop();
        }
        self.check();
        stopped
    }

    pub fn reset(&mut self) {
        self.variables.truncate(1);
        self.code.truncate(1);
        self.check();
    }

    fn check(&self) {
        debug_assert!(
            self.code.len() == self.variables.len() || self.code.len() + 1 == self.variables.len()
        );
    }
}
