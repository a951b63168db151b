use std::mem::MaybeUninit;

/// A simple slab arena.
///
/// A `Slab` stores values of type `T` in a contiguous array and
/// returns stable indices that can be reused after removal.
///
/// Internally, it keeps track of:
/// - initialized slots,
/// - free indices,
/// - and uninitialized memory using [`MaybeUninit`].
///
/// The expiry list uses this arena to hold its timer nodes: a node's
/// index is its handle, so unlinking a timer is an index lookup rather
/// than a pointer chase.
///
/// # Safety
///
/// This type uses `unsafe` internally but provides a safe API
/// as long as indices returned by [`insert`](Self::insert)
/// are not reused after [`remove`](Self::remove).
pub(crate) struct Slab<T> {
    /// Storage for items (may contain uninitialized slots).
    items: Vec<MaybeUninit<T>>,
    /// Stack of free indices that can be reused.
    free: Vec<usize>,
    /// Marks whether a slot is currently initialized.
    used: Vec<bool>,
    /// Number of initialized slots.
    len: usize,
}

impl<T> Slab<T> {
    /// Creates a new `Slab` with a fixed initial capacity.
    ///
    /// All slots are initially free and uninitialized.
    pub(crate) fn new(size: usize) -> Self {
        let items = (0..size).map(|_| MaybeUninit::<T>::uninit()).collect();
        let free = (0..size).collect();
        let used = (0..size).map(|_| false).collect();

        Self {
            items,
            free,
            used,
            len: 0,
        }
    }

    /// Inserts a value into the slab and returns its index.
    ///
    /// If a free slot is available, it is reused.
    /// Otherwise, the slab grows exponentially.
    pub(crate) fn insert(&mut self, item: T) -> usize {
        let index = if let Some(i) = self.free.pop() {
            i
        } else {
            let len = self.items.len();
            let new_len = if len == 0 { 1 } else { 2 * len };

            self.items
                .extend((len..new_len).map(|_| MaybeUninit::<T>::uninit()));
            self.free.extend((len + 1)..new_len);
            self.used.extend((len..new_len).map(|_| false));

            len
        };

        self.items[index] = MaybeUninit::new(item);
        self.used[index] = true;
        self.len += 1;

        index
    }

    /// Removes and returns the value stored at `index`.
    ///
    /// The slot becomes free and may be reused by future insertions.
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - `index` is out of bounds
    /// - the slot is not currently in use
    pub(crate) fn remove(&mut self, index: usize) -> T {
        assert!(index < self.items.len(), "Index out of range");
        assert!(self.used[index], "Item is not set");

        self.free.push(index);
        self.used[index] = false;
        self.len -= 1;

        let item = unsafe { self.items[index].assume_init_read() };
        self.items[index] = MaybeUninit::uninit();

        item
    }

    /// Returns a reference to the value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds or the slot is not in use.
    pub(crate) fn get(&self, index: usize) -> &T {
        assert!(index < self.items.len(), "Index out of range");
        assert!(self.used[index], "Item is not set");

        unsafe { self.items[index].assume_init_ref() }
    }

    /// Returns a mutable reference to the value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds or the slot is not in use.
    pub(crate) fn get_mut(&mut self, index: usize) -> &mut T {
        assert!(index < self.items.len(), "Index out of range");
        assert!(self.used[index], "Item is not set");

        unsafe { self.items[index].assume_init_mut() }
    }

    /// Returns the number of values currently stored.
    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

impl<T> Drop for Slab<T> {
    /// Drops all initialized elements stored in the slab.
    ///
    /// Uninitialized slots are ignored.
    fn drop(&mut self) {
        for (slot, &used) in self.items.iter_mut().zip(self.used.iter()) {
            if used {
                unsafe {
                    slot.assume_init_drop();
                }
            }
        }
    }
}
