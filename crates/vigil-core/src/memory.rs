#![forbid(unsafe_code)]

//! In-memory form host.
//!
//! [`MemoryForm`] implements both collaborator traits over a plain vector of
//! controls. It records every decoration it is asked to paint so tests can
//! assert on what a real page would show.
//!
//! Feature-gated under `test-helpers`.

use std::collections::HashMap;

use crate::control::{Attribute, ControlId, ControlKind, FileInfo, NodeId};
use crate::host::{DecorationHandles, FormHost, PresentationStyle, Presenter};

/// A control definition for [`MemoryForm`].
#[derive(Debug, Clone)]
pub struct MemoryControl {
    tag: String,
    attributes: Vec<Attribute>,
    value: String,
    default_value: String,
    checked: bool,
    default_checked: bool,
    selected: Vec<String>,
    files: Vec<FileInfo>,
}

impl MemoryControl {
    fn element(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            attributes: Vec::new(),
            value: String::new(),
            default_value: String::new(),
            checked: false,
            default_checked: false,
            selected: Vec::new(),
            files: Vec::new(),
        }
    }

    /// `<input type=...>`; the `type` attribute is recorded first.
    #[must_use]
    pub fn input(ty: &str) -> Self {
        Self::element("input").attr("type", ty)
    }

    #[must_use]
    pub fn textarea() -> Self {
        Self::element("textarea")
    }

    #[must_use]
    pub fn select() -> Self {
        Self::element("select")
    }

    #[must_use]
    pub fn button(ty: &str) -> Self {
        Self::element("button").attr("type", ty)
    }

    /// Append a raw attribute.
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    #[must_use]
    pub fn name(self, name: &str) -> Self {
        self.attr("name", name)
    }

    /// Set both the live and the authored value.
    #[must_use]
    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_owned();
        self.default_value = value.to_owned();
        self
    }

    /// Set both the live and the authored checked state.
    #[must_use]
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self.default_checked = checked;
        self
    }

    #[must_use]
    pub fn selected(mut self, values: &[&str]) -> Self {
        self.selected = values.iter().map(|v| (*v).to_owned()).collect();
        self
    }

    #[must_use]
    pub fn file(mut self, file: FileInfo) -> Self {
        self.files.push(file);
        self
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    fn kind(&self) -> ControlKind {
        ControlKind::from_markup(
            &self.tag,
            self.attribute("type"),
            self.attribute("multiple").is_some(),
        )
    }
}

/// What the presenter last painted for a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoration {
    Error(Vec<String>),
    Success,
}

/// A headless form: controls plus a record of presentation calls.
#[derive(Debug, Default)]
pub struct MemoryForm {
    controls: Vec<Option<MemoryControl>>,
    decorations: HashMap<ControlId, Decoration>,
    next_node: u64,
    locate_calls: usize,
    clear_calls: usize,
    submit_disabled: Option<bool>,
    native_validation_suppressed: bool,
}

impl MemoryForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a control and return its id.
    pub fn add(&mut self, control: MemoryControl) -> ControlId {
        let id = ControlId::from_raw(self.controls.len() as u32);
        self.controls.push(Some(control));
        id
    }

    /// Detach a control from the form. Its id is never reused.
    pub fn remove(&mut self, control: ControlId) {
        if let Some(slot) = self.controls.get_mut(control.raw() as usize) {
            *slot = None;
        }
    }

    pub fn set_value(&mut self, control: ControlId, value: &str) {
        if let Some(c) = self.get_mut(control) {
            c.value = value.to_owned();
        }
    }

    pub fn set_checked(&mut self, control: ControlId, checked: bool) {
        if let Some(c) = self.get_mut(control) {
            c.checked = checked;
        }
    }

    pub fn set_selected(&mut self, control: ControlId, values: &[&str]) {
        if let Some(c) = self.get_mut(control) {
            c.selected = values.iter().map(|v| (*v).to_owned()).collect();
        }
    }

    pub fn attach_file(&mut self, control: ControlId, file: FileInfo) {
        if let Some(c) = self.get_mut(control) {
            c.files.push(file);
        }
    }

    /// Restore every control to its authored value and checked state.
    pub fn restore_defaults(&mut self) {
        for control in self.controls.iter_mut().flatten() {
            control.value = control.default_value.clone();
            control.checked = control.default_checked;
        }
    }

    #[must_use]
    pub fn decoration(&self, control: ControlId) -> Option<&Decoration> {
        self.decorations.get(&control)
    }

    #[must_use]
    pub fn submit_disabled(&self) -> Option<bool> {
        self.submit_disabled
    }

    /// Number of times decoration nodes were looked up.
    #[must_use]
    pub fn locate_calls(&self) -> usize {
        self.locate_calls
    }

    #[must_use]
    pub fn clear_calls(&self) -> usize {
        self.clear_calls
    }

    #[must_use]
    pub fn native_validation_suppressed(&self) -> bool {
        self.native_validation_suppressed
    }

    fn get(&self, control: ControlId) -> Option<&MemoryControl> {
        self.controls.get(control.raw() as usize)?.as_ref()
    }

    fn get_mut(&mut self, control: ControlId) -> Option<&mut MemoryControl> {
        self.controls.get_mut(control.raw() as usize)?.as_mut()
    }

    fn live(&self) -> impl Iterator<Item = (ControlId, &MemoryControl)> {
        self.controls
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|c| (ControlId::from_raw(idx as u32), c)))
    }

    fn alloc_node(&mut self) -> NodeId {
        self.next_node += 1;
        NodeId::from_raw(self.next_node)
    }
}

impl FormHost for MemoryForm {
    fn controls(&self) -> Vec<ControlId> {
        self.live().map(|(id, _)| id).collect()
    }

    fn kind(&self, control: ControlId) -> ControlKind {
        self.get(control)
            .map_or(ControlKind::Hidden, MemoryControl::kind)
    }

    fn attributes(&self, control: ControlId) -> Vec<Attribute> {
        self.get(control)
            .map(|c| c.attributes.clone())
            .unwrap_or_default()
    }

    fn name(&self, control: ControlId) -> Option<String> {
        self.get(control)?.attribute("name").map(str::to_owned)
    }

    fn value(&self, control: ControlId) -> String {
        self.get(control).map(|c| c.value.clone()).unwrap_or_default()
    }

    fn default_value(&self, control: ControlId) -> String {
        self.get(control)
            .map(|c| c.default_value.clone())
            .unwrap_or_default()
    }

    fn checked(&self, control: ControlId) -> bool {
        self.get(control).is_some_and(|c| c.checked)
    }

    fn default_checked(&self, control: ControlId) -> bool {
        self.get(control).is_some_and(|c| c.default_checked)
    }

    fn selected_values(&self, control: ControlId) -> Vec<String> {
        self.get(control)
            .map(|c| c.selected.clone())
            .unwrap_or_default()
    }

    fn files(&self, control: ControlId) -> Vec<FileInfo> {
        self.get(control).map(|c| c.files.clone()).unwrap_or_default()
    }

    fn checked_in_group(&self, group: &str) -> usize {
        self.live()
            .filter(|(_, c)| c.kind().is_grouped() && c.checked && c.attribute("name") == Some(group))
            .count()
    }

    fn query(&self, selector: &str) -> Option<ControlId> {
        let selector = selector.trim();
        if let Some(id) = selector.strip_prefix('#') {
            return self
                .live()
                .find(|(_, c)| c.attribute("id") == Some(id))
                .map(|(id, _)| id);
        }
        let name = selector
            .strip_prefix("[name=")?
            .strip_suffix(']')?
            .trim_matches(|ch| ch == '"' || ch == '\'');
        self.live()
            .find(|(_, c)| c.attribute("name") == Some(name))
            .map(|(id, _)| id)
    }

    fn submit_control(&self) -> Option<ControlId> {
        self.live()
            .find(|(_, c)| {
                c.kind() == ControlKind::Submit
                    || (c.tag == "button" && c.attribute("type") == Some("submit"))
            })
            .map(|(id, _)| id)
    }
}

impl Presenter for MemoryForm {
    fn suppress_native_validation(&mut self) {
        self.native_validation_suppressed = true;
    }

    fn locate(&mut self, _control: ControlId, _style: &PresentationStyle) -> DecorationHandles {
        self.locate_calls += 1;
        DecorationHandles {
            class_target: Some(self.alloc_node()),
            error_text: Some(self.alloc_node()),
        }
    }

    fn show_error(
        &mut self,
        control: ControlId,
        _handles: &DecorationHandles,
        errors: &[String],
        _style: &PresentationStyle,
    ) {
        self.decorations
            .insert(control, Decoration::Error(errors.to_vec()));
    }

    fn show_success(
        &mut self,
        control: ControlId,
        _handles: &DecorationHandles,
        _style: &PresentationStyle,
    ) {
        self.decorations.insert(control, Decoration::Success);
    }

    fn clear_decorations(&mut self, _style: &PresentationStyle) {
        self.clear_calls += 1;
        self.decorations.clear();
    }

    fn set_submit_disabled(&mut self, _submit: ControlId, disabled: bool) {
        self.submit_disabled = Some(disabled);
    }
}
