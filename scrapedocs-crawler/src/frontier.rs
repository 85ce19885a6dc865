use std::collections::{HashSet, VecDeque};
use tracing::debug;
use url::Url;

/// Strip the fragment so `page#a` and `page#b` are the same page.
pub fn canonicalize(url: &Url) -> Url {
    let mut canonical = url.clone();
    canonical.set_fragment(None);
    canonical
}

/// FIFO work queue plus the set of pages already handed out.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<Url>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new(root: &Url) -> Self {
        let mut frontier = Self {
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
        };
        frontier.push(root);
        frontier
    }

    /// Pop the next unvisited page and mark it visited.
    pub fn next(&mut self) -> Option<Url> {
        while let Some(url) = self.queue.pop_front() {
            let key = url.to_string();
            self.queued.remove(&key);

            if !self.visited.insert(key) {
                debug!("Skipping already visited {}", url);
                continue;
            }
            return Some(url);
        }
        None
    }

    /// Queue a URL unless its canonical form was already visited or queued.
    /// Returns whether it was added.
    pub fn push(&mut self, url: &Url) -> bool {
        let canonical = canonicalize(url);
        let key = canonical.to_string();

        if self.visited.contains(&key) || self.queued.contains(&key) {
            return false;
        }

        self.queued.insert(key);
        self.queue.push_back(canonical);
        true
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(canonicalize(url).as_str())
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
