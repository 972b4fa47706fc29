//! Selection of the records a bulk operation visits

/// Which catalog records `enable` and `message` visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every record of every indexed type
    AllTypes,
    /// Every record of each listed type
    Types(Vec<String>),
    /// Every record of one type
    Type(String),
    /// The named records of one type
    TypeAndNames(String, Vec<String>),
}

impl Selection {
    pub fn types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Types(types.into_iter().map(Into::into).collect())
    }

    pub fn of_type(plugin_type: impl Into<String>) -> Self {
        Self::Type(plugin_type.into())
    }

    pub fn names<I, S>(plugin_type: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::TypeAndNames(plugin_type.into(), names.into_iter().map(Into::into).collect())
    }

    /// Whether the selection includes the given type
    pub fn includes_type(&self, plugin_type: &str) -> bool {
        match self {
            Self::AllTypes => true,
            Self::Types(types) => types.iter().any(|t| t == plugin_type),
            Self::Type(t) | Self::TypeAndNames(t, _) => t == plugin_type,
        }
    }

    /// Whether the selection includes the given record
    pub fn includes(&self, plugin_type: &str, name: &str) -> bool {
        match self {
            Self::TypeAndNames(t, names) => t == plugin_type && names.iter().any(|n| n == name),
            _ => self.includes_type(plugin_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_types_includes_everything() {
        assert!(Selection::AllTypes.includes("group1", "example1"));
        assert!(Selection::AllTypes.includes("other", "anything"));
    }

    #[test]
    fn test_types_selection() {
        let selection = Selection::types(["group1", "group2"]);
        assert!(selection.includes("group2", "example3"));
        assert!(!selection.includes("group3", "example3"));
    }

    #[test]
    fn test_named_selection_requires_type_and_name() {
        let selection = Selection::names("group1", ["example2"]);
        assert!(selection.includes("group1", "example2"));
        assert!(!selection.includes("group1", "example1"));
        assert!(!selection.includes("group2", "example2"));
        assert!(selection.includes_type("group1"));
    }
}
