//! Installer choice documents and the silent-install rewrite.
//!
//! `installer -showChoiceChangesXML` describes a package's selectable
//! components as a property-list array of dictionaries:
//!
//! ```text
//! <dict>
//!     <key>attributeSetting</key>   <integer>1</integer>
//!     <key>choiceAttribute</key>    <string>selected</string>
//!     <key>choiceIdentifier</key>   <string>org.python.Python.PythonFramework-3.13</string>
//! </dict>
//! ```
//!
//! [`rewrite_choices`] decides every `selected` item explicitly: on if its
//! identifier starts with an allowed prefix, off otherwise. Items with any
//! other attribute (install locations and the like) pass through untouched.

use std::io::Cursor;
use std::path::Path;

use plist::{Dictionary, Value};

use crate::error::{ProvisionError, ProvisionResult};
use crate::installer::NativeInstaller;
use crate::runner::CommandRunner;

/// Components kept in a silent install: the framework, the pip bootstrap,
/// and the free-threaded framework. No GUI apps, no `/usr/local` shims.
pub const DEFAULT_ALLOW_PREFIXES: [&str; 3] = [
    "org.python.Python.PythonFramework",
    "org.python.Python.PythonInstallPip",
    "org.python.Python.PythonTFramework",
];

const CHOICE_IDENTIFIER: &str = "choiceIdentifier";
const CHOICE_ATTRIBUTE: &str = "choiceAttribute";
const ATTRIBUTE_SETTING: &str = "attributeSetting";
const SELECTED: &str = "selected";

/// A parsed choice-changes document.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceDocument {
    items: Vec<Dictionary>,
}

impl ChoiceDocument {
    /// Parse an XML or binary property list.
    pub fn parse(bytes: &[u8]) -> ProvisionResult<Self> {
        let value = Value::from_reader(Cursor::new(bytes))
            .map_err(|e| ProvisionError::ChoiceDocument(e.to_string()))?;

        let array = match value {
            Value::Array(array) => array,
            other => {
                return Err(ProvisionError::ChoiceDocument(format!(
                    "expected an array of choices, found {}",
                    value_kind(&other)
                )))
            }
        };

        let items = array
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Dictionary(dict) => Ok(dict),
                other => Err(ProvisionError::ChoiceDocument(format!(
                    "choice {} is {}, not a dictionary",
                    i,
                    value_kind(&other)
                ))),
            })
            .collect::<ProvisionResult<Vec<_>>>()?;

        Ok(Self { items })
    }

    /// Serialize as an XML property list, the form `installer` consumes.
    pub fn to_xml(&self) -> ProvisionResult<Vec<u8>> {
        let value = Value::Array(self.items.iter().cloned().map(Value::Dictionary).collect());
        let mut out = Vec::new();
        value
            .to_writer_xml(&mut out)
            .map_err(|e| ProvisionError::ChoiceDocument(e.to_string()))?;
        Ok(out)
    }

    /// Number of choice items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the document has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the items.
    pub fn items(&self) -> impl Iterator<Item = ChoiceItem<'_>> {
        self.items.iter().map(ChoiceItem)
    }

    /// Find an item by its exact identifier.
    pub fn find(&self, identifier: &str) -> Option<ChoiceItem<'_>> {
        self.items().find(|item| item.identifier() == Some(identifier))
    }
}

/// Read-only view of one choice item.
#[derive(Debug, Clone, Copy)]
pub struct ChoiceItem<'a>(&'a Dictionary);

impl<'a> ChoiceItem<'a> {
    /// The hierarchical choice identifier.
    pub fn identifier(&self) -> Option<&'a str> {
        self.0.get(CHOICE_IDENTIFIER).and_then(Value::as_string)
    }

    /// The attribute kind (`selected`, `customLocation`, ...).
    pub fn attribute(&self) -> Option<&'a str> {
        self.0.get(CHOICE_ATTRIBUTE).and_then(Value::as_string)
    }

    /// Whether this item toggles a component on or off.
    pub fn is_selection(&self) -> bool {
        self.attribute() == Some(SELECTED)
    }

    /// The raw attribute setting.
    pub fn setting(&self) -> Option<&'a Value> {
        self.0.get(ATTRIBUTE_SETTING)
    }

    /// The setting as a selection flag, if it is an integer or boolean.
    pub fn is_enabled(&self) -> Option<bool> {
        match self.setting()? {
            Value::Integer(i) => i.as_signed().map(|v| v != 0),
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// Whether `identifier` starts with any of `allow_prefixes`.
pub fn is_allowed<S: AsRef<str>>(identifier: &str, allow_prefixes: &[S]) -> bool {
    allow_prefixes
        .iter()
        .any(|prefix| identifier.starts_with(prefix.as_ref()))
}

/// Decide every `selected` item: 1 when allowed, 0 otherwise.
pub fn rewrite_choices<S: AsRef<str>>(
    document: &ChoiceDocument,
    allow_prefixes: &[S],
) -> ChoiceDocument {
    let items = document
        .items
        .iter()
        .map(|dict| {
            if !ChoiceItem(dict).is_selection() {
                return dict.clone();
            }
            let identifier = ChoiceItem(dict).identifier().unwrap_or("");
            let enabled = is_allowed(identifier, allow_prefixes);

            let mut dict = dict.clone();
            dict.insert(
                ATTRIBUTE_SETTING.to_string(),
                Value::Integer(i64::from(enabled).into()),
            );
            dict
        })
        .collect();

    ChoiceDocument { items }
}

/// Query a package's choices and return the silent-install document.
pub fn build_silent_config<R: CommandRunner, S: AsRef<str>>(
    installer: &NativeInstaller<R>,
    installer_path: &Path,
    allow_prefixes: &[S],
) -> ProvisionResult<ChoiceDocument> {
    let document = installer.list_choices(installer_path)?;
    let rewritten = rewrite_choices(&document, allow_prefixes);

    for item in rewritten.items().filter(|i| i.is_selection()) {
        tracing::debug!(
            choice = item.identifier().unwrap_or("<unnamed>"),
            enabled = item.is_enabled().unwrap_or(false),
            "installer choice"
        );
    }

    Ok(rewritten)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "an array",
        Value::Dictionary(_) => "a dictionary",
        Value::Boolean(_) => "a boolean",
        Value::Data(_) => "data",
        Value::Date(_) => "a date",
        Value::Real(_) => "a real",
        Value::Integer(_) => "an integer",
        Value::String(_) => "a string",
        Value::Uid(_) => "a uid",
        _ => "an unknown value",
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Choice document in the shape a python.org package reports.
    pub(crate) const PYTHON_PKG_CHOICES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<array>
    <dict>
        <key>attributeSetting</key>
        <integer>1</integer>
        <key>choiceAttribute</key>
        <string>selected</string>
        <key>choiceIdentifier</key>
        <string>org.python.Python.PythonFramework-3.13</string>
    </dict>
    <dict>
        <key>attributeSetting</key>
        <integer>1</integer>
        <key>choiceAttribute</key>
        <string>selected</string>
        <key>choiceIdentifier</key>
        <string>org.python.Python.PythonApplications-3.13</string>
    </dict>
    <dict>
        <key>attributeSetting</key>
        <integer>1</integer>
        <key>choiceAttribute</key>
        <string>selected</string>
        <key>choiceIdentifier</key>
        <string>org.python.Python.PythonUnixTools-3.13</string>
    </dict>
    <dict>
        <key>attributeSetting</key>
        <integer>1</integer>
        <key>choiceAttribute</key>
        <string>selected</string>
        <key>choiceIdentifier</key>
        <string>org.python.Python.PythonDocumentation-3.13</string>
    </dict>
    <dict>
        <key>attributeSetting</key>
        <integer>1</integer>
        <key>choiceAttribute</key>
        <string>selected</string>
        <key>choiceIdentifier</key>
        <string>org.python.Python.PythonProfileChanges-3.13</string>
    </dict>
    <dict>
        <key>attributeSetting</key>
        <integer>1</integer>
        <key>choiceAttribute</key>
        <string>selected</string>
        <key>choiceIdentifier</key>
        <string>org.python.Python.PythonInstallPip-3.13</string>
    </dict>
    <dict>
        <key>attributeSetting</key>
        <integer>0</integer>
        <key>choiceAttribute</key>
        <string>selected</string>
        <key>choiceIdentifier</key>
        <string>org.python.Python.PythonTFramework-3.13</string>
    </dict>
    <dict>
        <key>attributeSetting</key>
        <string>/Library/Frameworks</string>
        <key>choiceAttribute</key>
        <string>customLocation</string>
        <key>choiceIdentifier</key>
        <string>org.python.Python.PythonFramework-3.13</string>
    </dict>
</array>
</plist>
"#;

    fn enabled(doc: &ChoiceDocument, identifier: &str) -> Option<bool> {
        doc.items()
            .find(|i| i.is_selection() && i.identifier() == Some(identifier))
            .and_then(|i| i.is_enabled())
    }

    #[test]
    fn test_parse_python_package_choices() {
        let doc = ChoiceDocument::parse(PYTHON_PKG_CHOICES.as_bytes()).unwrap();
        assert_eq!(doc.len(), 8);
        assert_eq!(doc.items().filter(|i| i.is_selection()).count(), 7);
        assert_eq!(
            enabled(&doc, "org.python.Python.PythonTFramework-3.13"),
            Some(false)
        );
    }

    #[test]
    fn test_rewrite_enables_only_allowed_components() {
        let doc = ChoiceDocument::parse(PYTHON_PKG_CHOICES.as_bytes()).unwrap();
        let out = rewrite_choices(&doc, &DEFAULT_ALLOW_PREFIXES);

        assert_eq!(enabled(&out, "org.python.Python.PythonFramework-3.13"), Some(true));
        assert_eq!(enabled(&out, "org.python.Python.PythonInstallPip-3.13"), Some(true));
        assert_eq!(enabled(&out, "org.python.Python.PythonTFramework-3.13"), Some(true));

        for off in [
            "org.python.Python.PythonApplications-3.13",
            "org.python.Python.PythonUnixTools-3.13",
            "org.python.Python.PythonDocumentation-3.13",
            "org.python.Python.PythonProfileChanges-3.13",
        ] {
            assert_eq!(enabled(&out, off), Some(false), "{} should be off", off);
        }
    }

    #[test]
    fn test_rewrite_is_total_over_selected_items() {
        let doc = ChoiceDocument::parse(PYTHON_PKG_CHOICES.as_bytes()).unwrap();
        let out = rewrite_choices(&doc, &DEFAULT_ALLOW_PREFIXES);

        for item in out.items().filter(|i| i.is_selection()) {
            match item.setting() {
                Some(Value::Integer(i)) => {
                    let v = i.as_signed().unwrap();
                    assert!(v == 0 || v == 1);
                }
                other => panic!("selected item without integer setting: {:?}", other),
            }
        }
    }

    #[test]
    fn test_rewrite_leaves_other_attributes_untouched() {
        let doc = ChoiceDocument::parse(PYTHON_PKG_CHOICES.as_bytes()).unwrap();
        let out = rewrite_choices(&doc, &["nothing.matches"]);

        let before: Vec<_> = doc.items().filter(|i| !i.is_selection()).collect();
        let after: Vec<_> = out.items().filter(|i| !i.is_selection()).collect();
        assert_eq!(before.len(), 1);
        assert_eq!(before[0].0, after[0].0);
        assert_eq!(
            after[0].setting().and_then(Value::as_string),
            Some("/Library/Frameworks")
        );
    }

    #[test]
    fn test_prefix_not_exact_match() {
        let allow = ["org.python.Python.PythonFramework"];

        // Longer identifiers sharing the prefix are enabled.
        assert!(is_allowed("org.python.Python.PythonFramework", &allow));
        assert!(is_allowed("org.python.Python.PythonFramework-3.13", &allow));
        assert!(is_allowed("org.python.Python.PythonFrameworkDocs", &allow));

        // Truncated or sibling identifiers are not.
        assert!(!is_allowed("org.python.Python.PythonFramewor", &allow));
        assert!(!is_allowed("org.python.Python.PythonTFramework-3.13", &allow));
        assert!(!is_allowed("com.org.python.Python.PythonFramework", &allow));
    }

    #[test]
    fn test_selected_item_without_identifier_is_disabled() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<array>
    <dict>
        <key>attributeSetting</key>
        <true/>
        <key>choiceAttribute</key>
        <string>selected</string>
    </dict>
</array>
</plist>"#;
        let doc = ChoiceDocument::parse(xml.as_bytes()).unwrap();
        let out = rewrite_choices(&doc, &DEFAULT_ALLOW_PREFIXES);
        let item = out.items().next().unwrap();
        assert_eq!(item.is_enabled(), Some(false));
    }

    #[test]
    fn test_xml_output_parses_back() {
        let doc = ChoiceDocument::parse(PYTHON_PKG_CHOICES.as_bytes()).unwrap();
        let out = rewrite_choices(&doc, &DEFAULT_ALLOW_PREFIXES);
        let xml = out.to_xml().unwrap();

        let text = String::from_utf8(xml.clone()).unwrap();
        assert!(text.contains("<plist"));
        assert_eq!(ChoiceDocument::parse(&xml).unwrap(), out);
    }

    #[test]
    fn test_rejects_non_array_document() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0"><dict><key>a</key><string>b</string></dict></plist>"#;
        let result = ChoiceDocument::parse(xml.as_bytes());
        assert!(matches!(result, Err(ProvisionError::ChoiceDocument(_))));

        assert!(ChoiceDocument::parse(b"not a plist").is_err());
    }

    #[test]
    fn test_find_by_identifier() {
        let doc = ChoiceDocument::parse(PYTHON_PKG_CHOICES.as_bytes()).unwrap();
        let item = doc.find("org.python.Python.PythonInstallPip-3.13").unwrap();
        assert!(item.is_selection());
        assert!(doc.find("org.python.Python").is_none());
    }
}
