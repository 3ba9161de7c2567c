use super::color::Color;

/// Something that knows how to paint itself into a slice of the screen.
///
/// The renderer calls [`draw`](Renderable::draw) on every subscribed entity,
/// in subscription order, with the same slice and the same buffer. Each entity
/// sees the buffer as left by the ones before it, so only the first entity of
/// a scene may clear it.
pub trait Renderable {
    /// Paints the slice whose first row is `slice_y` on screen.
    ///
    /// # Arguments
    /// * `slice_y` - Screen ordinate of the first row of the slice
    /// * `slice_height` - Number of rows in the slice
    /// * `buffer` - Row-major slice pixels, `SCREEN_WIDTH * slice_height` long
    fn draw(&self, slice_y: usize, slice_height: usize, buffer: &mut [Color]);
}

/// Two entities are the same when they live at the same address.
///
/// Vtable pointers are not compared: the same object seen through two
/// different trait-object coercions is still the same entity. Zero-sized
/// entities have no distinct address and cannot be told apart.
#[must_use]
pub fn same_entity(a: &dyn Renderable, b: &dyn Renderable) -> bool {
    std::ptr::addr_eq(a, b)
}
