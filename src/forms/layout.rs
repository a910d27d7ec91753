//! Presentation hints for an external form renderer: field order, labels and
//! widgets. Nothing here takes part in validation or persistence.

use serde::Serialize;

use crate::logic::validate::FormSchema;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormLayout {
    pub form_id: Option<&'static str>,
    /// Whether the renderer should emit the surrounding `<form>` element.
    pub form_tag: bool,
    pub disable_csrf: bool,
    pub entries: Vec<LayoutEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutEntry {
    Field {
        name: String,
        label: Option<&'static str>,
        widget: Widget,
    },
    Submit {
        name: &'static str,
        value: &'static str,
        css_class: &'static str,
        css_id: Option<&'static str>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Widget {
    Text,
    Textarea,
    Email,
    Date,
    Number,
    Checkbox,
    Select { choices: Vec<&'static str> },
    MultiSelect,
    InlineRadios { choices: Vec<(bool, &'static str)> },
    AppendedText { suffix: &'static str },
}

impl FormLayout {
    pub fn new(form_id: Option<&'static str>) -> Self {
        Self {
            form_id,
            form_tag: true,
            disable_csrf: false,
            entries: Vec::new(),
        }
    }

    pub fn without_form_tag(mut self) -> Self {
        self.form_tag = false;
        self
    }

    pub fn without_csrf(mut self) -> Self {
        self.disable_csrf = true;
        self
    }

    pub fn field(self, name: impl Into<String>, widget: Widget) -> Self {
        self.labelled(name, None, widget)
    }

    pub fn labelled(
        mut self,
        name: impl Into<String>,
        label: Option<&'static str>,
        widget: Widget,
    ) -> Self {
        self.entries.push(LayoutEntry::Field {
            name: name.into(),
            label,
            widget,
        });
        self
    }

    pub fn submit(mut self, name: &'static str, css_id: Option<&'static str>) -> Self {
        self.entries.push(LayoutEntry::Submit {
            name,
            value: "submit",
            css_class: "btn-block",
            css_id,
        });
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match entry {
            LayoutEntry::Field { name, .. } => Some(name.as_str()),
            LayoutEntry::Submit { .. } => None,
        })
    }

    /// Schema fields that have no display entry.
    pub fn missing_fields<'s>(&self, schema: &'s FormSchema) -> Vec<&'s str> {
        schema
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .filter(|name| !self.field_names().any(|shown| shown == *name))
            .collect()
    }
}

pub fn select(labels: &[&'static str]) -> Widget {
    Widget::Select {
        choices: labels.to_vec(),
    }
}
