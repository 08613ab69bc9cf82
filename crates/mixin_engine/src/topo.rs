//! Dependency ordering.
//!
//! Depth-first search with three colors. Every item is emitted after the
//! items it depends on; items with no ordering constraint between them keep
//! their input order. Dependencies that are not in the input are ignored.

use std::collections::BTreeMap;
use std::fmt;

/// A dependency cycle, listed from the first repeated item back to itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cycle<T> {
    /// Items on the cycle; the first and last entries are equal.
    pub path: Vec<T>,
}

impl<T> Cycle<T> {
    /// The item at which the cycle was detected.
    #[must_use]
    pub fn start(&self) -> Option<&T> {
        self.path.first()
    }
}

impl<T: fmt::Display> fmt::Display for Cycle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.iter().map(ToString::to_string).collect::<Vec<_>>();
        write!(f, "{}", path.join(" -> "))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    Unvisited,
    InProgress,
    Done,
}

/// Orders `items` so that every item follows its dependencies.
///
/// # Errors
///
/// Returns the first cycle found, including self-dependencies.
pub fn order_topological<T, F, I>(items: &[T], depends_on: F) -> Result<Vec<T>, Cycle<T>>
where
    T: Clone + Ord,
    F: Fn(&T) -> I,
    I: IntoIterator<Item = T>,
{
    let mut index = BTreeMap::new();
    for (i, item) in items.iter().enumerate() {
        index.entry(item).or_insert(i);
    }

    let mut sorter = Sorter {
        items,
        index: &index,
        depends_on: &depends_on,
        colors: vec![Color::Unvisited; items.len()],
        stack: Vec::new(),
        order: Vec::with_capacity(items.len()),
    };
    for i in 0..items.len() {
        if index.get(&items[i]) == Some(&i) {
            sorter.visit(i)?;
        }
    }
    Ok(sorter.order.into_iter().map(|i| items[i].clone()).collect())
}

struct Sorter<'a, T, F> {
    items: &'a [T],
    index: &'a BTreeMap<&'a T, usize>,
    depends_on: &'a F,
    colors: Vec<Color>,
    stack: Vec<usize>,
    order: Vec<usize>,
}

impl<T, F, I> Sorter<'_, T, F>
where
    T: Clone + Ord,
    F: Fn(&T) -> I,
    I: IntoIterator<Item = T>,
{
    fn visit(&mut self, i: usize) -> Result<(), Cycle<T>> {
        match self.colors[i] {
            Color::Done => return Ok(()),
            Color::InProgress => {
                let from = self.stack.iter().position(|&s| s == i).unwrap_or(0);
                let mut path: Vec<T> = self.stack[from..].iter().map(|&s| self.items[s].clone()).collect();
                path.push(self.items[i].clone());
                return Err(Cycle { path });
            }
            Color::Unvisited => {}
        }

        self.colors[i] = Color::InProgress;
        self.stack.push(i);
        for dependency in (self.depends_on)(&self.items[i]) {
            if let Some(&j) = self.index.get(&dependency) {
                self.visit(j)?;
            }
        }
        self.stack.pop();
        self.colors[i] = Color::Done;
        self.order.push(i);
        Ok(())
    }
}
