//! Boilerplate shared by every overlay type

/// Implements the property accessors of [`Overlay`](crate::layers::base::Overlay)
/// for a type holding an `OverlayProperties` field.
///
/// Usage:
/// ```ignore
/// impl Overlay for MyOverlay {
///     crate::impl_overlay_properties!(properties);
///     // render, bounds, ...
/// }
/// ```
#[macro_export]
macro_rules! impl_overlay_properties {
    ($properties_field:ident) => {
        fn id(&self) -> &str {
            &self.$properties_field.id
        }

        fn kind(&self) -> $crate::layers::base::OverlayKind {
            self.$properties_field.kind
        }

        fn z_index(&self) -> i32 {
            self.$properties_field.z_index
        }

        fn set_z_index(&mut self, z_index: i32) {
            self.$properties_field.z_index = z_index;
        }

        fn is_visible(&self) -> bool {
            self.$properties_field.visible
        }

        fn set_visible(&mut self, visible: bool) {
            self.$properties_field.visible = visible;
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}
