use std::collections::HashSet;

use gang_engine::cards::{full_deck, Card};
use gang_engine::deck::{deal, draw, shuffled_deck, Shuffler};
use gang_engine::player::PlayerId;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn ids(n: usize) -> Vec<PlayerId> {
    (0..n).map(|i| PlayerId::from(format!("p{i}"))).collect()
}

#[test]
fn shuffled_deck_is_a_permutation() {
    let mut rng = ChaCha20Rng::seed_from_u64(9);
    let deck = shuffled_deck(&mut rng);
    assert_eq!(deck.len(), 52);
    let seen: HashSet<Card> = deck.iter().copied().collect();
    let all: HashSet<Card> = full_deck().into_iter().collect();
    assert_eq!(seen, all);
}

#[test]
fn same_seed_same_order_different_seed_differs() {
    let a = Shuffler::new_with_seed(12345).shuffle();
    let b = Shuffler::new_with_seed(12345).shuffle();
    let c = Shuffler::new_with_seed(54321).shuffle();
    assert_eq!(a, b);
    assert_ne!(a, c, "different seeds should give different orders");
}

#[test]
fn successive_shuffles_from_one_shuffler_differ() {
    let mut shuffler = Shuffler::new_with_seed(1);
    let first = shuffler.shuffle();
    let second = shuffler.shuffle();
    assert_ne!(first, second);
}

#[test]
fn deal_hands_out_consecutive_pairs_in_order() {
    let deck = Shuffler::new_with_seed(5).shuffle();
    let players = ids(3);
    let (hands, rest) = deal(&deck, &players).expect("deal ok");

    assert_eq!(hands[&players[0]], [deck[0], deck[1]]);
    assert_eq!(hands[&players[1]], [deck[2], deck[3]]);
    assert_eq!(hands[&players[2]], [deck[4], deck[5]]);
    assert_eq!(rest.as_slice(), &deck[6..]);
    assert_eq!(deck.len(), 52, "input deck is not consumed");

    let dealt: HashSet<Card> = hands.values().flatten().copied().collect();
    assert_eq!(dealt.len(), 6, "no two players share a card");
}

#[test]
fn draw_takes_from_the_top() {
    let deck = full_deck();
    let (top, rest) = draw(&deck, 3);
    assert_eq!(top.as_slice(), &deck[..3]);
    assert_eq!(rest.len(), 49);

    let (none, all) = draw(&deck, 0);
    assert!(none.is_empty());
    assert_eq!(all, deck);
}
