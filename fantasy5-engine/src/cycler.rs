/// Parcours circulaire explicite d'une liste : `(liste, position)`.
#[derive(Debug, Clone)]
pub struct Cycler<T> {
    items: Vec<T>,
    position: usize,
}

impl<T: Clone> Cycler<T> {
    /// `None` si la liste est vide.
    pub fn new(items: Vec<T>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        Some(Self { items, position: 0 })
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn next_item(&mut self) -> T {
        let item = self.items[self.position].clone();
        self.position = (self.position + 1) % self.items.len();
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycler_wraps() {
        let mut c = Cycler::new(vec![3, 7, 9]).unwrap();
        let taken: Vec<u8> = (0..7).map(|_| c.next_item()).collect();
        assert_eq!(taken, vec![3, 7, 9, 3, 7, 9, 3]);
        assert_eq!(c.position(), 1);
    }

    #[test]
    fn test_cycler_empty() {
        assert!(Cycler::<u8>::new(vec![]).is_none());
    }

    #[test]
    fn test_cycler_independent_state() {
        let mut a = Cycler::new(vec!['x', 'y']).unwrap();
        let mut b = a.clone();
        a.next_item();
        assert_eq!(b.next_item(), 'x');
        assert_eq!(a.next_item(), 'y');
    }
}
