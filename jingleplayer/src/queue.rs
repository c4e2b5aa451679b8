//! File de lecture aléatoire sans répétition immédiate
//!
//! La file travaille sur des indices dans une liste de morceaux figée :
//! elle ne connaît pas les morceaux eux-mêmes. Un changement de liste (par
//! exemple un changement de saison) impose un nouvel appel à
//! [`ShuffleQueue::start`].
//!
//! Chaque tour visite tous les indices exactement une fois. Quand un tour
//! est épuisé, un nouveau mélange est tiré ; si son premier indice est le
//! morceau qui vient de se terminer, il est échangé avec le second.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct ShuffleQueue<R: Rng = StdRng> {
    /// Tour en cours : permutation de `0..len`
    order: Vec<usize>,
    /// Position du morceau courant dans `order`
    cursor: Option<usize>,
    len: usize,
    rng: R,
}

impl ShuffleQueue<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Default for ShuffleQueue<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ShuffleQueue<R> {
    /// File utilisant le générateur fourni (graine fixe dans les tests)
    pub fn with_rng(rng: R) -> Self {
        Self {
            order: Vec::new(),
            cursor: None,
            len: 0,
            rng,
        }
    }

    /// Démarre un nouveau tour sur une liste de `len` morceaux
    ///
    /// Retourne l'indice du morceau à jouer, `None` pour une liste vide.
    pub fn start(&mut self, len: usize) -> Option<usize> {
        self.len = len;
        self.order = self.permutation();
        self.cursor = if self.order.is_empty() { None } else { Some(0) };
        self.current()
    }

    /// Passe au morceau suivant
    ///
    /// Ne relit jamais la liste : seule la longueur donnée à `start` compte.
    pub fn advance(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }

        let Some(cursor) = self.cursor else {
            return self.start(self.len);
        };

        if cursor + 1 < self.order.len() {
            self.cursor = Some(cursor + 1);
            return self.current();
        }

        let finished = self.order[cursor];
        let mut next = self.permutation();
        if next.len() > 1 && next[0] == finished {
            next.swap(0, 1);
        }
        self.order = next;
        self.cursor = Some(0);
        self.current()
    }

    pub fn current(&self) -> Option<usize> {
        self.cursor.map(|c| self.order[c])
    }

    /// Morceau qui suivra dans le tour en cours
    ///
    /// `None` en fin de tour : le prochain dépend du mélange suivant.
    pub fn peek_next(&self) -> Option<usize> {
        self.pending().first().copied()
    }

    /// Indices restant à jouer dans le tour en cours
    pub fn pending(&self) -> &[usize] {
        match self.cursor {
            Some(c) => &self.order[c + 1..],
            None => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.cursor = None;
        self.len = 0;
    }

    // Fisher-Yates : toutes les permutations sont équiprobables
    fn permutation(&mut self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.len).collect();
        order.shuffle(&mut self.rng);
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn seeded(seed: u64) -> ShuffleQueue<StdRng> {
        ShuffleQueue::with_rng(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_start_visits_every_index_once() {
        let mut queue = seeded(7);
        let first = queue.start(12).unwrap();

        let mut seen = vec![first];
        seen.extend_from_slice(queue.pending());
        let unique: HashSet<_> = seen.iter().copied().collect();

        assert_eq!(seen.len(), 12);
        assert_eq!(unique, (0..12).collect());
    }

    #[test]
    fn test_each_round_is_a_permutation() {
        let mut queue = seeded(11);
        let mut played = vec![queue.start(5).unwrap()];
        for _ in 0..14 {
            played.push(queue.advance().unwrap());
        }

        for round in played.chunks(5) {
            let unique: HashSet<_> = round.iter().copied().collect();
            assert_eq!(unique.len(), 5, "round {:?} repeats a track", round);
        }
    }

    #[test]
    fn test_no_immediate_repeat_across_reshuffles() {
        for seed in 0..200 {
            let mut queue = seeded(seed);
            let mut previous = queue.start(2).unwrap();
            for _ in 0..20 {
                let next = queue.advance().unwrap();
                assert_ne!(previous, next, "seed {} repeated {}", seed, next);
                previous = next;
            }
        }
    }

    #[test]
    fn test_single_track_loops() {
        let mut queue = seeded(3);
        assert_eq!(queue.start(1), Some(0));
        for _ in 0..5 {
            assert_eq!(queue.advance(), Some(0));
        }
    }

    #[test]
    fn test_empty_list_has_no_current_track() {
        let mut queue = seeded(3);
        assert_eq!(queue.start(0), None);
        assert_eq!(queue.advance(), None);
        assert!(queue.is_empty());
        assert!(queue.pending().is_empty());
    }

    #[test]
    fn test_peek_next_matches_advance() {
        let mut queue = seeded(5);
        queue.start(4);
        let expected = queue.peek_next();
        assert_eq!(queue.advance(), expected);
    }

    #[test]
    fn test_clear_forgets_the_list() {
        let mut queue = seeded(5);
        queue.start(4);
        queue.clear();
        assert_eq!(queue.current(), None);
        assert_eq!(queue.advance(), None);
    }

    #[test]
    fn test_first_track_is_roughly_uniform() {
        let mut queue = seeded(42);
        let mut counts = [0usize; 4];
        for _ in 0..4000 {
            counts[queue.start(4).unwrap()] += 1;
        }
        for count in counts {
            assert!((800..1200).contains(&count), "skewed counts {:?}", counts);
        }
    }
}
