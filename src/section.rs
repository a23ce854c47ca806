use std::collections::BTreeMap;
use std::collections::btree_map;

/// A named group of properties. Lookups ignore case; the display name keeps
/// the casing the section was first created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    properties: BTreeMap<String, Property>,
}

impl Section {
    #[must_use]
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            properties: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Properties in the order they are saved.
    #[must_use]
    pub fn properties(&self) -> Properties<'_> {
        Properties {
            inner: self.properties.values(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Property> {
        self.properties.get(&property_key(key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Insert or overwrite the property stored under the normalized `key`.
    pub(crate) fn insert(&mut self, key: &str, value: &str) {
        let name = key.trim();
        let property = Property {
            name: name.to_owned(),
            value: value.trim().to_owned(),
        };

        self.properties.insert(name.to_lowercase(), property);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    name: String,
    value: String,
}

impl Property {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

#[derive(Debug, Clone)]
pub struct Properties<'a> {
    inner: btree_map::Values<'a, String, Property>,
}

impl<'a> Iterator for Properties<'a> {
    type Item = &'a Property;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Properties<'_> {}

pub(crate) fn section_key(name: &str) -> String {
    name.to_lowercase()
}

pub(crate) fn property_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_overwrites_case_insensitively() {
        let mut section = Section::new("General".to_owned());
        section.insert("Language", "en");
        section.insert("  LANGUAGE ", " de ");

        assert_eq!(section.len(), 1);

        let property = section.get("language").expect("property was inserted");
        assert_eq!(property.name(), "LANGUAGE");
        assert_eq!(property.value(), "de");
    }

    #[test]
    fn properties_iterate_in_normalized_order() {
        let mut section = Section::new("Order".to_owned());
        section.insert("beta", "2");
        section.insert("Alpha", "1");
        section.insert("gamma", "3");

        let names = section.properties().map(Property::name).collect::<Vec<_>>();
        assert_eq!(names, ["Alpha", "beta", "gamma"]);
    }
}
