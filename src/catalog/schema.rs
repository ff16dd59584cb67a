use serde::Deserialize;
use serde_json::Value;

use crate::error::{FragError, Result};

/// One downloadable fragment file within a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub id: String,
    pub url: String,
    pub label: String,
}

/// A named group of fragments that load together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub id: String,
    pub label: String,
    pub fragments: Vec<Fragment>,
}

/// Validated model catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    packages: Vec<Package>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    fragments: Vec<RawFragment>,
}

#[derive(Debug, Deserialize)]
struct RawFragment {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    label: Option<String>,
}

impl Catalog {
    /// Parses and validates catalog JSON.
    ///
    /// Accepts either a bare array of packages or an object wrapping the
    /// array as `{"models": [...]}`. Validation is eager: the whole document
    /// is checked before anything is returned, and the first structural
    /// problem aborts the parse.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| FragError::Validation(format!("catalog is not valid JSON: {e}")))?;

        let entries = match value {
            Value::Array(entries) => entries,
            Value::Object(mut map) => match map.remove("models") {
                Some(Value::Array(entries)) => entries,
                _ => return Err(shape_error()),
            },
            _ => return Err(shape_error()),
        };

        let mut packages = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let raw: RawPackage = serde_json::from_value(entry)
                .map_err(|e| FragError::Validation(format!("package at index {index}: {e}")))?;
            packages.push(validate_package(index, raw)?);
        }

        Ok(Catalog { packages })
    }

    /// All packages, in catalog order
    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Find package by id
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.id == id)
    }

    /// Get all package ids
    #[must_use]
    pub fn all_ids(&self) -> Vec<&str> {
        self.packages.iter().map(|p| p.id.as_str()).collect()
    }

    /// Find closest package id using Levenshtein distance
    #[must_use]
    pub fn suggest(&self, id: &str) -> Option<&str> {
        if id.is_empty() {
            return None;
        }

        self.packages
            .iter()
            .map(|p| (p.id.as_str(), levenshtein_distance(id, &p.id)))
            .min_by_key(|(_, dist)| *dist)
            .filter(|(_, dist)| *dist <= 2) // Only suggest if within 2 edits
            .map(|(package_id, _)| package_id)
    }
}

fn shape_error() -> FragError {
    FragError::Validation(
        "catalog must be an array of packages or an object with a models array".to_string(),
    )
}

fn validate_package(index: usize, raw: RawPackage) -> Result<Package> {
    let id = nonempty(raw.id)
        .ok_or_else(|| FragError::Validation(format!("package at index {index} is missing an id")))?;

    // Display label falls back through the optional name to the id itself.
    let label = nonempty(raw.label)
        .or_else(|| nonempty(raw.name))
        .unwrap_or_else(|| id.clone());

    if raw.fragments.is_empty() {
        return Err(FragError::Validation(format!(
            "package \"{id}\" must declare a non-empty fragments array"
        )));
    }

    let mut fragments = Vec::with_capacity(raw.fragments.len());
    for (frag_index, frag) in raw.fragments.into_iter().enumerate() {
        let frag_id = nonempty(frag.id).ok_or_else(|| {
            FragError::Validation(format!(
                "fragment at index {frag_index} in package \"{id}\" is missing an id"
            ))
        })?;
        let url = nonempty(frag.url).ok_or_else(|| {
            FragError::Validation(format!(
                "fragment \"{frag_id}\" in package \"{id}\" is missing a url"
            ))
        })?;
        let label = nonempty(frag.label).unwrap_or_else(|| frag_id.clone());
        fragments.push(Fragment {
            id: frag_id,
            url,
            label,
        });
    }

    Ok(Package {
        id,
        label,
        fragments,
    })
}

fn nonempty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Calculate Levenshtein distance between two strings
#[allow(clippy::needless_range_loop)]
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let len1 = s1.chars().count();
    let len2 = s2.chars().count();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

    for i in 0..=len1 {
        matrix[i][0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    for (i, c1) in s1_chars.iter().enumerate() {
        for (j, c2) in s2_chars.iter().enumerate() {
            let cost = usize::from(c1 != c2);
            matrix[i + 1][j + 1] = (matrix[i][j + 1] + 1)
                .min(matrix[i + 1][j] + 1)
                .min(matrix[i][j] + cost);
        }
    }

    matrix[len1][len2]
}
