/*
 * Renders the form state into the three generated views: compact chips, the
 * numbered row list, and the template row. Rendering is a pure function of
 * the state and always produces the complete set of views.
 *
 * Each render is stamped with a generation number and every per-file control
 * carries it in its `ControlBinding`. `resolve_binding` is the single place
 * where an activated control is turned back into an action and an index, so
 * a binding left over from an older render can never act on the wrong file.
 */
use crate::core::{DragReorderController, MAX_SECTION_FILES, SectionCollection, TemplateSlot};
use crate::platform_layer::types::{
    ButtonView, ChipView, ControlBinding, CountLabel, FormViews, RowAction, SectionRowView,
    TemplateRowView,
};

pub const NO_TEMPLATE_TEXT: &str = "No template chosen";
pub const NO_SECTIONS_TEXT: &str = "No Markdown files yet";

pub fn render_form_views(
    collection: &SectionCollection,
    slot: &TemplateSlot,
    drag: &DragReorderController,
    generation: u64,
) -> FormViews {
    let len = collection.len();
    let bind = |action: RowAction, index: usize| ControlBinding {
        generation,
        action,
        index,
    };

    let chips = collection
        .iter()
        .enumerate()
        .map(|(index, file)| ChipView {
            label: file.name.clone(),
            title: format!("Section {}", index + 1),
            remove_aria_label: format!("Remove {}", file.name),
            remove: bind(RowAction::Remove, index),
        })
        .collect();

    let rows = collection
        .iter()
        .enumerate()
        .map(|(index, file)| SectionRowView {
            rank: index + 1,
            index,
            label: format!("{}. {}", index + 1, file.name),
            move_up: ButtonView {
                binding: bind(RowAction::MoveUp, index),
                enabled: index > 0,
            },
            move_down: ButtonView {
                binding: bind(RowAction::MoveDown, index),
                enabled: index + 1 < len,
            },
            remove: ButtonView {
                binding: bind(RowAction::Remove, index),
                enabled: true,
            },
            draggable: true,
            is_drag_source: drag.active_source() == Some(index),
            is_drop_candidate: drag.is_drop_candidate(index),
        })
        .collect();

    let list_placeholder = collection.is_empty().then(|| {
        format!("{NO_SECTIONS_TEXT}. Add up to {MAX_SECTION_FILES} and drag rows to reorder.")
    });

    let template_row = slot.get().map(|template| TemplateRowView {
        label: format!("Template: {}", template.name),
        file_name: template.name.clone(),
    });

    FormViews {
        generation,
        chips,
        rows,
        list_placeholder,
        template_row,
        template_name_text: slot
            .get()
            .map(|t| t.name.clone())
            .unwrap_or_else(|| NO_TEMPLATE_TEXT.to_string()),
        count_label: count_label(len),
    }
}

pub fn count_label(len: usize) -> CountLabel {
    match len {
        0 => CountLabel {
            text: NO_SECTIONS_TEXT.to_string(),
            muted: true,
        },
        1 => CountLabel {
            text: "1 file".to_string(),
            muted: false,
        },
        n => CountLabel {
            text: format!("{n} files"),
            muted: false,
        },
    }
}

/*
 * Maps an activated binding to the action and index it refers to in the
 * current state. Bindings from another render generation, or whose index no
 * longer exists, resolve to `None`.
 */
pub fn resolve_binding(
    binding: &ControlBinding,
    current_generation: u64,
    collection_len: usize,
) -> Option<(RowAction, usize)> {
    if binding.generation != current_generation {
        log::debug!(
            "FormView: Binding {binding:?} is from generation {}, current is {current_generation}",
            binding.generation
        );
        return None;
    }
    if binding.index >= collection_len {
        log::debug!("FormView: Binding {binding:?} is past the end ({collection_len})");
        return None;
    }
    Some((binding.action, binding.index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FileDescriptor;

    fn state(names: &[&str], template: Option<&str>) -> (SectionCollection, TemplateSlot) {
        let mut collection = SectionCollection::new();
        collection.add(
            names.iter().map(|n| FileDescriptor::from_bytes(*n, 9, vec![0])),
            |_| true,
        );
        let mut slot = TemplateSlot::new();
        if let Some(t) = template {
            slot.set(FileDescriptor::from_bytes(t, 9, vec![0]));
        }
        (collection, slot)
    }

    #[test]
    fn test_rows_are_numbered_and_bound_to_current_indices() {
        // Arrange
        let (collection, slot) = state(&["intro.md", "body.md", "end.md"], Some("tpl.docx"));
        let drag = DragReorderController::new();

        // Act
        let views = render_form_views(&collection, &slot, &drag, 7);

        // Assert
        let labels: Vec<_> = views.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["1. intro.md", "2. body.md", "3. end.md"]);
        for (i, row) in views.rows.iter().enumerate() {
            assert_eq!(row.index, i);
            assert_eq!(row.remove.binding.index, i);
            assert_eq!(row.remove.binding.generation, 7);
        }
        assert!(!views.rows[0].move_up.enabled);
        assert!(views.rows[0].move_down.enabled);
        assert!(views.rows[2].move_up.enabled);
        assert!(!views.rows[2].move_down.enabled);
        assert!(views.list_placeholder.is_none());
    }

    #[test]
    fn test_chips_expose_remove_bound_to_index() {
        let (collection, slot) = state(&["a.md", "b.md"], None);
        let views = render_form_views(&collection, &slot, &DragReorderController::new(), 1);

        assert_eq!(views.chips.len(), 2);
        assert_eq!(views.chips[1].title, "Section 2");
        assert_eq!(views.chips[1].remove_aria_label, "Remove b.md");
        assert_eq!(
            views.chips[1].remove,
            ControlBinding {
                generation: 1,
                action: RowAction::Remove,
                index: 1
            }
        );
    }

    #[test]
    fn test_template_row_and_empty_state() {
        let (collection, slot) = state(&[], None);
        let views = render_form_views(&collection, &slot, &DragReorderController::new(), 0);
        assert!(views.template_row.is_none());
        assert_eq!(views.template_name_text, NO_TEMPLATE_TEXT);
        assert_eq!(
            views.list_placeholder.as_deref(),
            Some("No Markdown files yet. Add up to 20 and drag rows to reorder.")
        );
        assert!(views.count_label.muted);

        let (collection, slot) = state(&["a.md"], Some("house.docx"));
        let views = render_form_views(&collection, &slot, &DragReorderController::new(), 0);
        assert_eq!(views.template_row.unwrap().label, "Template: house.docx");
        assert_eq!(views.count_label.text, "1 file");
    }

    #[test]
    fn test_drag_markers_are_rendered() {
        let (collection, slot) = state(&["a.md", "b.md", "c.md"], None);
        let mut drag = DragReorderController::new();
        drag.drag_start(0, collection.len());
        drag.drag_over(2);

        let views = render_form_views(&collection, &slot, &drag, 3);

        assert!(views.rows[0].is_drag_source);
        assert!(views.rows[2].is_drop_candidate);
        assert!(!views.rows[1].is_drop_candidate);
    }

    #[test]
    fn test_count_label_plural() {
        assert_eq!(count_label(2).text, "2 files");
        assert_eq!(count_label(20).text, "20 files");
    }

    #[test]
    fn test_resolve_binding_rejects_stale_generation_and_index() {
        let binding = ControlBinding {
            generation: 4,
            action: RowAction::MoveDown,
            index: 2,
        };
        assert_eq!(resolve_binding(&binding, 4, 3), Some((RowAction::MoveDown, 2)));
        assert_eq!(resolve_binding(&binding, 5, 3), None);
        assert_eq!(resolve_binding(&binding, 4, 2), None);
    }
}
