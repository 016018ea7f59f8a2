/*
 * Capacity-one holder for the template document that the ordered sections are
 * merged into. Setting a template always replaces the previous one.
 */
use crate::core::file_descriptor::FileDescriptor;

#[derive(Debug, Clone, Default)]
pub struct TemplateSlot {
    template: Option<FileDescriptor>,
}

impl TemplateSlot {
    pub fn new() -> Self {
        TemplateSlot { template: None }
    }

    pub fn set(&mut self, file: FileDescriptor) {
        if let Some(previous) = &self.template {
            log::debug!(
                "TemplateSlot: Replacing template '{}' with '{}'",
                previous.name,
                file.name
            );
        }
        self.template = Some(file);
    }

    pub fn clear(&mut self) {
        self.template = None;
    }

    pub fn take(&mut self) -> Option<FileDescriptor> {
        self.template.take()
    }

    pub fn get(&self) -> Option<&FileDescriptor> {
        self.template.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.template.is_some()
    }
}
