// Integration tests for the swipe/match engine over the in-memory store

use std::sync::Arc;
use swipe_match::core::{CandidateSelector, MatchEngine, RatioCalculator};
use swipe_match::models::{NewProfile, NewUser, SwipeOutcome, UserId};
use swipe_match::services::{MemoryStore, SwipeStore};

struct Fixture {
    store: Arc<MemoryStore>,
    engine: MatchEngine,
    selector: CandidateSelector,
    ratios: RatioCalculator,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let ratios = RatioCalculator::new(store.clone());
        Self {
            engine: MatchEngine::new(store.clone()),
            selector: CandidateSelector::new(store.clone(), ratios.clone()),
            ratios,
            store,
        }
    }

    async fn user(&self, name: &str) -> UserId {
        let user = self
            .store
            .create_user(NewUser {
                username: name.to_lowercase(),
                first_name: name.to_string(),
                date_of_birth: None,
            })
            .await
            .unwrap();

        self.store
            .create_profile(
                user.id,
                NewProfile {
                    bio: format!("{}'s bio", name),
                    job_title: "Engineer".to_string(),
                    company: "Acme".to_string(),
                },
            )
            .await
            .unwrap();

        user.id
    }

    async fn deck_owners(&self, user_id: UserId) -> Vec<String> {
        self.selector
            .next_deck(user_id)
            .await
            .unwrap()
            .into_iter()
            .map(|card| card.first_name)
            .collect()
    }
}

#[tokio::test]
async fn test_right_then_right_scenario() {
    let fx = Fixture::new();
    let a = fx.user("Alice").await;
    let b = fx.user("Bob").await;
    fx.user("Carol").await;

    let first = fx.engine.record_swipe(a, b, "right").await.unwrap();
    assert_eq!(first, SwipeOutcome { created: true, match_formed: false });

    let second = fx.engine.record_swipe(b, a, "right").await.unwrap();
    assert_eq!(second, SwipeOutcome { created: true, match_formed: true });

    assert_eq!(fx.deck_owners(a).await, vec!["Carol"]);
    assert_eq!(fx.store.match_count().await, 1);
}

#[tokio::test]
async fn test_left_then_right_scenario() {
    let fx = Fixture::new();
    let a = fx.user("Alice").await;
    let b = fx.user("Bob").await;

    let first = fx.engine.record_swipe(a, b, "left").await.unwrap();
    assert_eq!(first, SwipeOutcome { created: true, match_formed: false });

    let second = fx.engine.record_swipe(a, b, "right").await.unwrap();
    assert!(!second.created);
    assert!(!second.match_formed);

    // Bob liking Alice now cannot form a match: her left swipe stands
    let reply = fx.engine.record_swipe(b, a, "right").await.unwrap();
    assert_eq!(reply, SwipeOutcome { created: true, match_formed: false });
    assert_eq!(fx.store.match_count().await, 0);
}

#[tokio::test]
async fn test_duplicate_swipe_leaves_single_row() {
    let fx = Fixture::new();
    let a = fx.user("Alice").await;
    let b = fx.user("Bob").await;

    fx.engine.record_swipe(a, b, "right").await.unwrap();
    let again = fx.engine.record_swipe(a, b, "right").await.unwrap();

    assert_eq!(again, SwipeOutcome::DUPLICATE);
    assert_eq!(fx.store.swipe_count().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mutual_swipes_form_exactly_one_match() {
    let fx = Fixture::new();
    let mut pairs = Vec::new();
    for i in 0..25 {
        let a = fx.user(&format!("Left{}", i)).await;
        let b = fx.user(&format!("Right{}", i)).await;
        pairs.push((a, b));
    }

    let mut handles = Vec::new();
    for &(a, b) in &pairs {
        let one = fx.engine.clone();
        let two = fx.engine.clone();
        handles.push(tokio::spawn(async move { one.record_swipe(a, b, "right").await }));
        handles.push(tokio::spawn(async move { two.record_swipe(b, a, "right").await }));
    }

    let mut formed = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert!(outcome.created);
        if outcome.match_formed {
            formed += 1;
        }
    }

    // At least one side of every pair observes the reciprocal swipe
    assert!(formed >= pairs.len());
    assert_eq!(fx.store.match_count().await, pairs.len());

    for &(a, b) in &pairs {
        let matches = fx.engine.matches_for(a).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].pair.other(a), Some(b));
    }
}

#[tokio::test]
async fn test_deck_excludes_self_and_every_swiped_user() {
    let fx = Fixture::new();
    let a = fx.user("Alice").await;
    let b = fx.user("Bob").await;
    let c = fx.user("Carol").await;
    fx.user("Dave").await;

    assert_eq!(fx.deck_owners(a).await, vec!["Bob", "Carol", "Dave"]);

    fx.engine.record_swipe(a, b, "left").await.unwrap();
    fx.engine.record_swipe(a, c, "right").await.unwrap();
    assert_eq!(fx.deck_owners(a).await, vec!["Dave"]);

    // Being swiped on does not remove anyone from your own deck
    assert_eq!(fx.deck_owners(b).await, vec!["Alice", "Carol", "Dave"]);
}

#[tokio::test]
async fn test_empty_deck_is_not_an_error() {
    let fx = Fixture::new();
    let a = fx.user("Alice").await;
    let b = fx.user("Bob").await;

    fx.engine.record_swipe(a, b, "right").await.unwrap();

    assert!(fx.selector.next_deck(a).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deck_is_a_fresh_read() {
    let fx = Fixture::new();
    let a = fx.user("Alice").await;
    fx.user("Bob").await;

    assert_eq!(fx.deck_owners(a).await, vec!["Bob"]);
    fx.user("Carol").await;
    assert_eq!(fx.deck_owners(a).await, vec!["Bob", "Carol"]);
}

#[tokio::test]
async fn test_deck_cards_carry_ratios_and_ordered_photos() {
    let fx = Fixture::new();
    let a = fx.user("Alice").await;
    let b = fx.user("Bob").await;
    let c = fx.user("Carol").await;

    let bob_profile = fx.store.profile_for_user(b).await.unwrap().unwrap();
    fx.store.add_photo(bob_profile.id, "profile_photos/b2.jpg", 2).await.unwrap();
    fx.store.add_photo(bob_profile.id, "profile_photos/b1.jpg", 1).await.unwrap();

    fx.engine.record_swipe(b, a, "right").await.unwrap();
    fx.engine.record_swipe(b, c, "left").await.unwrap();

    let deck = fx.selector.next_deck(a).await.unwrap();
    let bob = deck.iter().find(|card| card.first_name == "Bob").unwrap();
    let carol = deck.iter().find(|card| card.first_name == "Carol").unwrap();

    assert_eq!(bob.swipe_ratio, Some(50));
    assert_eq!(bob.acceptance_ratio, None);
    let images: Vec<&str> = bob.photos.iter().map(|p| p.image.as_str()).collect();
    assert_eq!(images, vec!["profile_photos/b1.jpg", "profile_photos/b2.jpg"]);

    assert_eq!(carol.swipe_ratio, None);
    assert_eq!(carol.acceptance_ratio, None);
}

#[tokio::test]
async fn test_ratios_follow_the_ledger() {
    let fx = Fixture::new();
    let u = fx.user("Uma").await;
    let others: Vec<UserId> = {
        let mut ids = Vec::new();
        for name in ["Vic", "Wes", "Xan", "Yul"] {
            ids.push(fx.user(name).await);
        }
        ids
    };

    assert_eq!(fx.ratios.swipe_ratio(u).await.unwrap(), None);
    assert_eq!(fx.ratios.acceptance_ratio(u).await.unwrap(), None);

    // Uma: right on Vic and Wes, left on Xan
    fx.engine.record_swipe(u, others[0], "right").await.unwrap();
    fx.engine.record_swipe(u, others[1], "right").await.unwrap();
    fx.engine.record_swipe(u, others[2], "left").await.unwrap();
    assert_eq!(fx.ratios.swipe_ratio(u).await.unwrap(), Some(67));

    // Vic, Xan and Yul like Uma back; only Vic was liked by Uma
    fx.engine.record_swipe(others[0], u, "right").await.unwrap();
    fx.engine.record_swipe(others[2], u, "right").await.unwrap();
    fx.engine.record_swipe(others[3], u, "right").await.unwrap();
    assert_eq!(fx.ratios.acceptance_ratio(u).await.unwrap(), Some(33));
}

#[tokio::test]
async fn test_acceptance_ratio_ignores_missing_match_rows() {
    let fx = Fixture::new();
    let a = fx.user("Alice").await;
    let b = fx.user("Bob").await;

    fx.engine.record_swipe(a, b, "right").await.unwrap();
    fx.engine.record_swipe(b, a, "right").await.unwrap();

    let pair = swipe_match::UserPair::new(a, b).unwrap();
    assert!(fx.store.remove_match(pair).await);

    assert_eq!(fx.ratios.acceptance_ratio(a).await.unwrap(), Some(100));
    assert_eq!(fx.engine.reconcile_matches().await.unwrap(), 1);
    assert_eq!(fx.store.match_count().await, 1);
}
