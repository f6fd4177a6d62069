use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "My Hill Chart";
pub const DEFAULT_SCOPE_NAME: &str = "New Scope";

/// A named marker plotted along the hill by its progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub id: String,
    pub name: String,
    /// Progress along the curve in `[0, 1]`: 0 is the left edge, 0.5 the top of the hill and 1
    /// the right edge.
    pub position: f64,
}

/// The full chart: a title plus the scopes in display order.
///
/// Scope ids are unique within one value. Insertion order is z-order and carries no priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartState {
    pub title: String,
    pub scopes: Vec<Scope>,
}

impl Default for ChartState {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            scopes: Vec::new(),
        }
    }
}

impl ChartState {
    pub fn scope(&self, id: &str) -> Option<&Scope> {
        self.scopes.iter().find(|s| s.id == id)
    }

    pub fn scope_mut(&mut self, id: &str) -> Option<&mut Scope> {
        self.scopes.iter_mut().find(|s| s.id == id)
    }

    pub fn contains_scope(&self, id: &str) -> bool {
        self.scope(id).is_some()
    }

    /// Returns the first id that occurs more than once, if any.
    pub fn duplicate_scope_id(&self) -> Option<&str> {
        let mut seen = std::collections::HashSet::with_capacity(self.scopes.len());
        self.scopes
            .iter()
            .find(|s| !seen.insert(s.id.as_str()))
            .map(|s| s.id.as_str())
    }
}

/// Partial update for chart-level fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartPatch {
    pub title: Option<String>,
}

impl ChartPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }
}

/// Partial update for a single scope. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopePatch {
    pub name: Option<String>,
    pub position: Option<f64>,
}

impl ScopePatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            position: None,
        }
    }

    pub fn position(position: f64) -> Self {
        Self {
            name: None,
            position: Some(position),
        }
    }

    pub(crate) fn apply(&self, scope: &mut Scope) {
        if let Some(name) = self.name.as_deref() {
            let name = name.trim();
            // Submitting blank text is treated as "no change".
            if !name.is_empty() {
                scope.name = name.to_string();
            }
        }
        if let Some(position) = self.position.and_then(clamp_position) {
            scope.position = position;
        }
    }
}

/// Clamps a finite position into `[0, 1]`; non-finite values are rejected.
pub fn clamp_position(position: f64) -> Option<f64> {
    position.is_finite().then(|| position.clamp(0.0, 1.0))
}
