use super::color::Color;
use super::renderable::{Renderable, same_entity};

/// Ordered list of the entities to notify when a slice must be drawn.
///
/// The list borrows its entities, it never owns them: whoever created an
/// entity keeps it alive for as long as it stays subscribed. Subscription
/// order is compositing order.
#[derive(Default)]
pub struct ObserverList<'a> {
    listeners: Vec<&'a dyn Renderable>,
}

impl<'a> ObserverList<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Appends `renderable` at the end of the list.
    ///
    /// No duplicate check is performed: an entity subscribed twice is drawn
    /// twice per slice.
    pub fn subscribe(&mut self, renderable: &'a dyn Renderable) {
        self.listeners.push(renderable);
    }

    /// Removes the first occurrence of `renderable`, if any.
    ///
    /// Returns whether an entry was removed.
    pub fn unsubscribe(&mut self, renderable: &dyn Renderable) -> bool {
        let position = self
            .listeners
            .iter()
            .position(|listener| same_entity(*listener, renderable));

        if let Some(index) = position {
            self.listeners.remove(index);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn has_subscribed(&self, renderable: &dyn Renderable) -> bool {
        self.listeners
            .iter()
            .any(|listener| same_entity(*listener, renderable))
    }

    /// Asks every entity, in subscription order, to draw the slice.
    ///
    /// With no subscriber the buffer is left exactly as supplied.
    pub fn draw(&self, slice_y: usize, slice_height: usize, buffer: &mut [Color]) {
        for listener in &self.listeners {
            listener.draw(slice_y, slice_height, buffer);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a dyn Renderable> + '_ {
        self.listeners.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::ObserverList;
    use crate::render::color::Color;
    use crate::render::renderable::{Renderable, same_entity};
    use pretty_assertions::assert_eq;

    /// Fills the first `width` pixels of every row with its color and counts
    /// how many times it was asked to draw.
    struct Stamp {
        color: Color,
        width: usize,
        calls: Cell<usize>,
    }

    impl Stamp {
        const fn new(color: u16, width: usize) -> Self {
            Self {
                color: Color(color),
                width,
                calls: Cell::new(0),
            }
        }
    }

    impl Renderable for Stamp {
        fn draw(&self, _slice_y: usize, slice_height: usize, buffer: &mut [Color]) {
            self.calls.set(self.calls.get() + 1);
            let row_len = buffer.len() / slice_height;
            for row in buffer.chunks_mut(row_len) {
                row[..self.width].fill(self.color);
            }
        }
    }

    fn identities(list: &ObserverList<'_>) -> Vec<*const ()> {
        list.iter()
            .map(|r| std::ptr::from_ref(r).cast::<()>())
            .collect()
    }

    #[test]
    fn subscribe_appends_in_order() {
        let a = Stamp::new(1, 1);
        let b = Stamp::new(2, 1);
        let mut list = ObserverList::new();

        list.subscribe(&a);
        list.subscribe(&b);

        assert_eq!(list.len(), 2);
        let order: Vec<_> = list.iter().collect();
        assert!(same_entity(order[0], &a));
        assert!(same_entity(order[1], &b));
    }

    #[test]
    fn has_subscribed_on_empty_list_is_false() {
        let a = Stamp::new(1, 1);
        let list = ObserverList::new();

        assert!(list.is_empty());
        assert!(!list.has_subscribed(&a));
    }

    #[test]
    fn subscribe_then_unsubscribe_restores_the_list() {
        let a = Stamp::new(1, 1);
        let b = Stamp::new(2, 1);
        let mut list = ObserverList::new();
        list.subscribe(&a);
        let before = identities(&list);

        list.subscribe(&b);
        assert!(list.has_subscribed(&b));
        assert!(list.unsubscribe(&b));

        assert!(!list.has_subscribed(&b));
        assert_eq!(identities(&list), before);
    }

    #[test]
    fn unsubscribe_head_promotes_next() {
        let a = Stamp::new(1, 1);
        let b = Stamp::new(2, 1);
        let c = Stamp::new(3, 1);
        let mut list = ObserverList::new();
        list.subscribe(&a);
        list.subscribe(&b);
        list.subscribe(&c);

        assert!(list.unsubscribe(&a));

        let order: Vec<_> = list.iter().collect();
        assert_eq!(order.len(), 2);
        assert!(same_entity(order[0], &b));
        assert!(same_entity(order[1], &c));
    }

    #[test]
    fn unsubscribe_absent_is_a_no_op() {
        let a = Stamp::new(1, 1);
        let b = Stamp::new(2, 1);
        let mut list = ObserverList::new();
        list.subscribe(&a);

        assert!(!list.unsubscribe(&b));
        assert_eq!(list.len(), 1);

        let mut empty = ObserverList::new();
        assert!(!empty.unsubscribe(&a));
    }

    #[test]
    fn duplicates_are_kept_and_removed_one_at_a_time() {
        let a = Stamp::new(1, 1);
        let mut list = ObserverList::new();
        list.subscribe(&a);
        list.subscribe(&a);

        let mut buffer = [Color::BLACK; 4];
        list.draw(0, 1, &mut buffer);
        assert_eq!(a.calls.get(), 2);

        assert!(list.unsubscribe(&a));
        assert!(list.has_subscribed(&a));
        assert!(list.unsubscribe(&a));
        assert!(!list.has_subscribed(&a));
    }

    #[test]
    fn draw_composites_in_subscription_order() {
        let wide = Stamp::new(0x1111, 3);
        let narrow = Stamp::new(0x2222, 1);
        let mut list = ObserverList::new();
        list.subscribe(&wide);
        list.subscribe(&narrow);

        let mut buffer = [Color::BLACK; 8];
        list.draw(0, 2, &mut buffer);

        let row = [Color(0x2222), Color(0x1111), Color(0x1111), Color::BLACK];
        assert_eq!(buffer[..4], row);
        assert_eq!(buffer[4..], row);
    }

    #[test]
    fn draw_with_no_subscriber_leaves_the_buffer_alone() {
        let list = ObserverList::new();
        let mut buffer = [Color(0xBEEF); 6];

        list.draw(0, 2, &mut buffer);

        assert_eq!(buffer, [Color(0xBEEF); 6]);
    }
}
