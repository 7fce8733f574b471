#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<Card>, // top of the deck is the last element
}

impl Deck {
    /// the full 52, in rank-major order until shuffled
    pub fn fresh() -> Deck {
        Deck {
            cards: (0..crate::DECK_SIZE as u8).map(Card::from).collect(),
        }
    }
    pub fn empty() -> Deck {
        Deck { cards: Vec::new() }
    }
    pub fn shuffle(&mut self, rng: &mut SmallRng) {
        self.cards.shuffle(rng);
    }
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }
    pub fn len(&self) -> usize {
        self.cards.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
    pub fn clear(&mut self) {
        self.cards.clear();
    }
    /// refill from a discard pile, leaving its top card behind as context
    /// for matching conditions. no-op unless the discard holds >= 2 cards.
    pub fn refill(&mut self, discard: &mut Vec<Card>, rng: &mut SmallRng) {
        if self.cards.is_empty() && discard.len() >= 2 {
            let top = discard.pop().expect("discard checked non-empty");
            self.cards.append(discard);
            self.cards.shuffle(rng);
            discard.push(top);
        }
    }
}

use super::card::Card;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
