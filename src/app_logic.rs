/*
 * This module provides the application logic layer, centered around
 * `FormController` which acts as the Presenter/Controller for one document
 * form. `form_view` turns form state into view descriptors, and
 * `ui_constants` holds the logical control IDs shared with the layout
 * description. Unit tests for `FormController` are in `handler_tests.rs`.
 */
pub mod form_view;
pub mod handler;
pub mod ui_constants;


pub use handler::FormController;
