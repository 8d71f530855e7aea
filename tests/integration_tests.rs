// Integration tests for the ranking pipeline

use chrono::{DateTime, Duration, Utc};
use matrimony_match::core::{default_pool_filter, ranking::BoostPolicy, Matcher};
use matrimony_match::models::{
    Attribute, DeclinedProfile, FailedDirection, FindMatchesResponse, InteractionHistory,
    InterestStatus, MatchRecord, MatchStatus, Profile, ProfileRecord, ScoringWeights,
};
use std::collections::HashMap;

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-06-01T09:30:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn from_json(json: serde_json::Value) -> Profile {
    let record: ProfileRecord = serde_json::from_value(json).unwrap();
    Profile::try_from(record).unwrap()
}

fn seeker() -> Profile {
    from_json(serde_json::json!({
        "id": "p-seeker", "userId": "seeker", "gender": "Male",
        "dateOfBirth": "1992-03-14", "approvalStatus": "approved",
        "dietaryPreference": "vegetarian", "religion": "Hindu", "motherTongue": "Marathi",
        "height": "5'10\"",
        "prefDiet": "vegetarian", "prefDietIsDealbreaker": true,
        "prefReligion": "Hindu", "prefReligionIsDealbreaker": true,
        "prefAgeMin": "26", "prefAgeMax": "32",
        "prefHeightMin": "155", "prefHeightMax": "172",
        "prefMotherTongue": "Same as mine",
        "prefSmoking": "Doesn't Matter", "prefSmokingIsDealbreaker": true
    }))
}

fn candidate(id: &str, overrides: serde_json::Value) -> Profile {
    let mut base = serde_json::json!({
        "id": format!("p-{}", id), "userId": id, "gender": "female",
        "age": 29, "approvalStatus": "approved",
        "dietaryPreference": "Vegetarian", "religion": "hindu", "motherTongue": "marathi",
        "height": "163 cm"
    });
    if let (Some(base), Some(extra)) = (base.as_object_mut(), overrides.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    from_json(base)
}

#[test]
fn test_integration_end_to_end_matching() {
    let matcher = Matcher::with_default_weights();
    let candidates = vec![
        candidate("perfect", serde_json::json!({})),
        candidate("older", serde_json::json!({"age": 35})),
        candidate("tall", serde_json::json!({"height": "5'9\""})),
        candidate("nonveg", serde_json::json!({"dietaryPreference": "Non-Vegetarian"})),
        candidate("christian", serde_json::json!({"religion": "Christian", "dietaryPreference": "Eggetarian"})),
        candidate("picky", serde_json::json!({"prefHeightMin": "6'", "prefHeightIsDealbreaker": true})),
        candidate("man", serde_json::json!({"gender": "male"})),
        candidate("hidden", serde_json::json!({"approvalStatus": "pending"})),
        candidate("suspended", serde_json::json!({"isSuspended": true})),
    ];

    let result = matcher.rank(
        &seeker(),
        &candidates,
        &InteractionHistory::default(),
        &default_pool_filter(),
        now(),
    );

    assert_eq!(result.total_candidates, 9);

    let fresh: Vec<_> = result.fresh.iter().map(|c| c.user_id.as_str()).collect();
    assert_eq!(fresh[0], "perfect");
    assert_eq!(result.fresh[0].match_score.percentage, 100);
    assert!(fresh.contains(&"older"));
    assert!(fresh.contains(&"tall"));
    for c in &result.fresh {
        assert!(c.failed_criteria.is_empty());
        assert_eq!(c.interest_status, InterestStatus::None);
    }

    let near: HashMap<_, _> = result
        .near_matches
        .iter()
        .map(|c| (c.user_id.as_str(), c))
        .collect();
    assert_eq!(near.len(), 3);
    assert_eq!(near["nonveg"].failed_direction, Some(FailedDirection::Seeker));
    assert_eq!(near["christian"].failed_criteria.len(), 2);
    assert_eq!(near["picky"].failed_direction, Some(FailedDirection::Candidate));

    assert!(result.fresh.iter().chain(&result.near_matches).all(|c| {
        !["man", "hidden", "suspended"].contains(&c.user_id.as_str())
    }));

    assert_eq!(result.blockers[0].attribute, Attribute::Diet);
    assert_eq!(result.blockers[0].count, 2);
    assert!(result.boost_activations.is_empty());
}

#[test]
fn test_interaction_history_routes_candidates() {
    let matcher = Matcher::with_default_weights();
    let names = ["fresh", "liker", "sent", "mutual", "i-declined", "they-declined", "they-rejected"];
    let candidates: Vec<Profile> = names.iter().map(|n| candidate(n, serde_json::json!({}))).collect();

    let history = InteractionHistory::new(
        vec![
            MatchRecord { sender_id: "liker".into(), receiver_id: "seeker".into(), status: MatchStatus::Pending },
            MatchRecord { sender_id: "seeker".into(), receiver_id: "sent".into(), status: MatchStatus::Pending },
            MatchRecord { sender_id: "seeker".into(), receiver_id: "mutual".into(), status: MatchStatus::Accepted },
            MatchRecord { sender_id: "seeker".into(), receiver_id: "they-rejected".into(), status: MatchStatus::Rejected },
        ],
        vec![
            DeclinedProfile { user_id: "seeker".into(), declined_user_id: "i-declined".into() },
            DeclinedProfile { user_id: "they-declined".into(), declined_user_id: "seeker".into() },
        ],
    );

    let result = matcher.rank(&seeker(), &candidates, &history, &default_pool_filter(), now());

    let fresh: Vec<_> = result.fresh.iter().map(|c| c.user_id.as_str()).collect();
    assert_eq!(fresh, vec!["liker", "fresh"]);
    assert!(result.fresh[0].they_liked_me_first);
    assert_eq!(result.fresh[0].interest_status, InterestStatus::Received);

    assert_eq!(result.mutual.len(), 1);
    assert_eq!(result.mutual[0].user_id, "mutual");
    assert!(result.near_matches.is_empty());
}

#[test]
fn test_boosted_candidates_lead_each_list() {
    let matcher = Matcher::with_default_weights().with_boost_policy(BoostPolicy {
        referral_window: Duration::days(30),
        engagement_window: Duration::days(7),
        referral_threshold: 5,
    });

    let mut expired = candidate("expired", serde_json::json!({}));
    expired.engagement_boost_start = Some(now() - Duration::days(8));
    let candidates = vec![
        candidate("best", serde_json::json!({})),
        candidate("referrer", serde_json::json!({"age": 34, "referralCount": 5})),
        candidate("almost", serde_json::json!({"age": 34, "referralCount": 4})),
        candidate("engaged", serde_json::json!({"age": 35, "engagementBoostStart": "2024-05-30T00:00:00Z"})),
        expired,
    ];

    let result = matcher.rank(&seeker(), &candidates, &InteractionHistory::default(), &default_pool_filter(), now());

    let order: Vec<_> = result.fresh.iter().map(|c| (c.user_id.as_str(), c.is_boosted)).collect();
    assert!(order[0].1 && order[1].1);
    assert!(order[2..].iter().all(|(_, boosted)| !boosted));
    assert_eq!(order[2].0, "best");

    assert_eq!(result.boost_activations.len(), 1);
    assert_eq!(result.boost_activations[0].profile_id, "p-referrer");
    assert_eq!(result.boost_activations[0].started_at, now());
}

#[test]
fn test_weight_overrides_change_ordering() {
    let candidates = vec![
        candidate("short", serde_json::json!({"height": "150 cm"})),
        candidate("older", serde_json::json!({"age": 38})),
    ];
    let rank = |weights: ScoringWeights| {
        Matcher::new(weights)
            .rank(&seeker(), &candidates, &InteractionHistory::default(), &default_pool_filter(), now())
            .fresh
            .into_iter()
            .map(|c| c.user_id)
            .collect::<Vec<_>>()
    };

    let mut age_heavy = HashMap::new();
    age_heavy.insert("age".to_string(), 50.0);
    let mut height_heavy = HashMap::new();
    height_heavy.insert("height".to_string(), 50.0);

    assert_eq!(rank(ScoringWeights::default().with_overrides(&age_heavy).unwrap()), vec!["short", "older"]);
    assert_eq!(rank(ScoringWeights::default().with_overrides(&height_heavy).unwrap()), vec!["older", "short"]);
}

#[test]
fn test_ranking_is_deterministic() {
    let matcher = Matcher::with_default_weights();
    let candidates: Vec<Profile> = (0..40)
        .map(|i| candidate(&format!("c{:02}", i), serde_json::json!({"age": 26 + (i % 5)})))
        .collect();
    let mut reversed = candidates.clone();
    reversed.reverse();

    let a = matcher.rank(&seeker(), &candidates, &InteractionHistory::default(), &default_pool_filter(), now());
    let b = matcher.rank(&seeker(), &reversed, &InteractionHistory::default(), &default_pool_filter(), now());
    assert_eq!(a.fresh, b.fresh);

    let page = a.clone().paginate(10, 10);
    assert_eq!(page.fresh.as_slice(), &a.fresh[10..20]);
}

#[test]
fn test_response_serialization_shape() {
    let matcher = Matcher::with_default_weights();
    let candidates = vec![candidate("nonveg", serde_json::json!({"dietaryPreference": "non-veg"}))];
    let result = matcher.rank(&seeker(), &candidates, &InteractionHistory::default(), &default_pool_filter(), now());

    let response = FindMatchesResponse {
        matches: result.fresh,
        mutual_matches: result.mutual,
        near_matches: result.near_matches,
        blockers: result.blockers,
        boost_activations: result.boost_activations,
        total_candidates: result.total_candidates,
        execution_time_ms: 0,
    };
    let json = serde_json::to_value(&response).unwrap();

    let criterion = &json["nearMatches"][0]["failedCriteria"][0];
    assert_eq!(criterion["name"], "dietaryPreference");
    assert_eq!(criterion["direction"], "seeker");
    assert_eq!(criterion["preference"], "vegetarian");
    assert_eq!(criterion["value"], "non-veg");
    assert_eq!(criterion["isDealbreaker"], true);
    assert_eq!(json["nearMatches"][0]["failedDirection"], "seeker");
    assert!(json.get("boostActivations").is_none());
}
