// Unit tests for the matching core

use chrono::NaiveDate;
use matrimony_match::core::{
    classifier::{attribute_satisfied, is_mutual_match, matches_seeker_preferences},
    explainer::explain,
    predicate::satisfies,
    ranking::sort_fresh,
    scoring::calculate_match_score,
};
use matrimony_match::models::{
    Attribute, AttributeValue, InterestStatus, MatchScore, Preference, PreferenceError,
    PreferenceSet, Profile, ProfileRecord, RankedCandidate, ScoringWeights,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn profile(json: &str) -> Profile {
    let record: ProfileRecord = serde_json::from_str(json).expect("valid record json");
    Profile::try_from(record).expect("convertible record")
}

fn vegetarian_seeker() -> Profile {
    profile(
        r#"{
            "id": "seeker", "gender": "male", "age": 33,
            "dietaryPreference": "vegetarian",
            "prefDiet": "vegetarian", "prefDietIsDealbreaker": true,
            "prefAgeMin": "28", "prefAgeMax": "35", "prefAgeIsDealbreaker": false
        }"#,
    )
}

fn candidate(id: &str, diet: &str, age: u32) -> Profile {
    Profile::new(id, format!("user-{}", id), "female")
        .with_age(age)
        .with_attribute(Attribute::Diet, diet)
}

#[test]
fn test_wildcard_accepts_every_value() {
    let values = [
        AttributeValue::Text("vegetarian"),
        AttributeValue::Text("5'4\""),
        AttributeValue::Text("anything at all"),
        AttributeValue::Number(0.0),
        AttributeValue::Missing,
    ];

    for attribute in Attribute::ALL {
        for raw in ["doesnt_matter", "", "Doesn't Matter", "doesnt-matter"] {
            let pref = Preference::parse(Some(raw), attribute).unwrap();
            assert!(pref.is_wildcard(), "{:?} for {}", raw, attribute);
            for value in values {
                assert!(satisfies(&pref, value, attribute.kind(), AttributeValue::Missing));
            }
        }
    }
}

#[test]
fn test_height_range_is_inclusive() {
    let seeker = profile(r#"{"id": "s", "gender": "male", "prefHeightMin": "160", "prefHeightMax": "170"}"#);
    let at = |height: &str| {
        let c = Profile::new("c", "c", "female").with_attribute(Attribute::Height, height);
        attribute_satisfied(&seeker, &c, Attribute::Height, today())
    };

    assert!(at("160"));
    assert!(at("170"));
    assert!(at("165 cm"));
    assert!(!at("159"));
    assert!(!at("171"));
}

#[test]
fn test_age_range_is_inclusive() {
    let seeker = vegetarian_seeker();
    let at = |age: u32| attribute_satisfied(&seeker, &candidate("c", "vegetarian", age), Attribute::Age, today());

    assert!(at(28));
    assert!(at(35));
    assert!(!at(27));
    assert!(!at(36));
}

#[test]
fn test_feet_and_inches_compare_in_centimetres() {
    let seeker = profile(r#"{"id": "s", "gender": "male", "prefHeightMin": "5'2\"", "prefHeightMax": "5ft 8in"}"#);
    let tall = Profile::new("c", "c", "female").with_attribute(Attribute::Height, "6'");
    let fits = Profile::new("d", "d", "female").with_attribute(Attribute::Height, "165cm");
    assert!(!attribute_satisfied(&seeker, &tall, Attribute::Height, today()));
    assert!(attribute_satisfied(&seeker, &fits, Attribute::Height, today()));
}

#[test]
fn test_wildcard_never_carries_a_dealbreaker() {
    // Legacy record with the flag set on a "doesn't matter" preference
    let p = profile(r#"{"id": "p", "gender": "female", "prefReligion": "Doesn't matter", "prefReligionIsDealbreaker": true}"#);
    assert!(!p.preferences.is_dealbreaker(Attribute::Religion));
    assert!(p.preferences.preference(Attribute::Religion).is_wildcard());

    let mut prefs = PreferenceSet::new()
        .with(Attribute::Religion, Preference::Exact("hindu".into()), true)
        .unwrap();
    assert!(prefs.is_dealbreaker(Attribute::Religion));

    prefs.set_preference(Attribute::Religion, Preference::Wildcard).unwrap();
    assert!(!prefs.is_dealbreaker(Attribute::Religion));

    assert_eq!(
        prefs.set_dealbreaker(Attribute::Religion, true),
        Err(PreferenceError::DealbreakerOnWildcard(Attribute::Religion))
    );
    assert_eq!(prefs.dealbreakers().count(), 0);
}

#[test]
fn test_mutuality_is_symmetric_but_score_is_not() {
    let a = profile(
        r#"{
            "id": "a", "gender": "male", "age": 30, "religion": "hindu", "dietaryPreference": "vegan",
            "prefReligion": "hindu", "prefDiet": "vegan", "prefAgeMin": "24", "prefAgeMax": "29"
        }"#,
    );
    let b = profile(
        r#"{
            "id": "b", "gender": "female", "age": 27, "religion": "hindu", "dietaryPreference": "vegetarian",
            "prefReligion": "hindu", "prefReligionIsDealbreaker": true
        }"#,
    );
    let weights = ScoringWeights::default();

    assert_eq!(is_mutual_match(&a, &b, today()), is_mutual_match(&b, &a, today()));
    assert!(is_mutual_match(&a, &b, today()));

    let ab = calculate_match_score(&a, &b, &weights, today());
    let ba = calculate_match_score(&b, &a, &weights, today());
    assert_ne!(ab.percentage, ba.percentage);
    assert_eq!(ba.percentage, 100);
}

#[test]
fn test_mutuality_symmetric_when_one_side_rejects() {
    let seeker = vegetarian_seeker();
    let strict = profile(
        r#"{"id": "c", "gender": "female", "age": 30, "dietaryPreference": "vegetarian",
            "prefAgeMax": "31", "prefAgeIsDealbreaker": true}"#,
    );
    assert!(matches_seeker_preferences(&seeker, &strict, today()));
    assert!(!is_mutual_match(&seeker, &strict, today()));
    assert!(!is_mutual_match(&strict, &seeker, today()));
}

#[test]
fn test_non_mutual_pairs_are_fully_explained() {
    let seeker = vegetarian_seeker();
    let pairs = vec![
        candidate("nonveg", "non_vegetarian", 30),
        candidate("missing", "", 30),
        profile(
            r#"{"id": "picky", "gender": "female", "age": 30, "dietaryPreference": "vegetarian",
                "prefReligion": "jain", "prefReligionIsDealbreaker": true,
                "prefHeightMin": "180", "prefHeightIsDealbreaker": true}"#,
        ),
    ];

    for c in &pairs {
        assert!(!is_mutual_match(&seeker, c, today()));
        let explanation = explain(&seeker, c, &ScoringWeights::default(), today());
        assert!(!explanation.failed_criteria.is_empty(), "{} unexplained", c.id);

        for criterion in &explanation.failed_criteria {
            let forward = attribute_satisfied(&seeker, c, criterion.attribute, today());
            let backward = attribute_satisfied(c, &seeker, criterion.attribute, today());
            assert!(!forward || !backward, "{} listed but passes both ways", criterion.name);
        }
    }
}

#[test]
fn test_boost_dominates_score() {
    let ranked = |id: &str, boosted: bool, percentage: u8| RankedCandidate {
        profile_id: id.to_string(),
        user_id: id.to_string(),
        match_score: MatchScore {
            percentage,
            total_score: percentage as f64,
            max_score: 100.0,
        },
        interest_status: InterestStatus::None,
        is_boosted: boosted,
        they_liked_me_first: false,
        failed_criteria: vec![],
        failed_direction: None,
    };

    let mut list = vec![ranked("u99", false, 99), ranked("u50", false, 50), ranked("b10", true, 10)];
    sort_fresh(&mut list);
    let order: Vec<_> = list.iter().map(|c| c.profile_id.as_str()).collect();
    assert_eq!(order, vec!["b10", "u99", "u50"]);
}

#[test]
fn test_dealbreaker_diet_fails_regardless_of_age() {
    let seeker = vegetarian_seeker();
    let c = candidate("c", "non_vegetarian", 30);

    assert!(attribute_satisfied(&seeker, &c, Attribute::Age, today()));
    assert!(!matches_seeker_preferences(&seeker, &c, today()));
}

#[test]
fn test_soft_age_miss_passes_gate_but_scores_lower() {
    let seeker = vegetarian_seeker();
    let weights = ScoringWeights::default();
    let older = candidate("older", "vegetarian", 40);
    let in_range = candidate("in_range", "vegetarian", 30);

    assert!(matches_seeker_preferences(&seeker, &older, today()));
    assert!(matches_seeker_preferences(&seeker, &in_range, today()));

    let older_score = calculate_match_score(&seeker, &older, &weights, today());
    let in_range_score = calculate_match_score(&seeker, &in_range, &weights, today());
    assert!(older_score.percentage < in_range_score.percentage);
}

#[test]
fn test_age_from_date_of_birth() {
    let p = profile(r#"{"id": "p", "gender": "female", "dateOfBirth": "1994-06-02", "age": 99}"#);
    assert_eq!(p.age_on(today()), Some(29));
    assert_eq!(p.age_on(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()), Some(30));
}

#[test]
fn test_same_as_mine() {
    let seeker = profile(r#"{"id": "s", "gender": "male", "motherTongue": "Tamil", "prefMotherTongue": "Same as mine"}"#);
    let tamil = Profile::new("t", "t", "female").with_attribute(Attribute::MotherTongue, "tamil");
    let hindi = Profile::new("h", "h", "female").with_attribute(Attribute::MotherTongue, "Hindi");
    assert!(attribute_satisfied(&seeker, &tamil, Attribute::MotherTongue, today()));
    assert!(!attribute_satisfied(&seeker, &hindi, Attribute::MotherTongue, today()));
}

#[test]
fn test_list_preference_matches_any_overlap() {
    let seeker = profile(r#"{"id": "s", "gender": "male", "prefHobbies": "reading, trekking"}"#);
    let overlap = Profile::new("o", "o", "female").with_attribute(Attribute::Hobbies, "Music,Trekking");
    let none = Profile::new("n", "n", "female").with_attribute(Attribute::Hobbies, "music");
    assert!(attribute_satisfied(&seeker, &overlap, Attribute::Hobbies, today()));
    assert!(!attribute_satisfied(&seeker, &none, Attribute::Hobbies, today()));
}

#[test]
fn test_capitalised_preference_matches_case_insensitively() {
    let prefs = PreferenceSet::new()
        .with(Attribute::Diet, Preference::Exact("Vegetarian".into()), true)
        .unwrap()
        .with(Attribute::Community, Preference::OneOf(vec!["Punjabi".into(), "Sindhi".into()]), false)
        .unwrap();
    let seeker = Profile::new("s", "s", "male").with_preferences(prefs);
    let c = Profile::new("c", "c", "female")
        .with_attribute(Attribute::Diet, "Vegetarian")
        .with_attribute(Attribute::Community, "SINDHI");

    assert!(attribute_satisfied(&seeker, &c, Attribute::Diet, today()));
    assert!(attribute_satisfied(&seeker, &c, Attribute::Community, today()));
    assert!(matches_seeker_preferences(&seeker, &c, today()));
}

#[test]
fn test_income_band_preference_keeps_its_unit() {
    let band = Preference::parse(Some("5-10L"), Attribute::Income).unwrap();
    let prefs = PreferenceSet::new().with(Attribute::Income, band, true).unwrap();
    let seeker = Profile::new("s", "s", "male").with_preferences(prefs);
    let earning = |income: &str| {
        let c = Profile::new("c", "c", "female").with_attribute(Attribute::Income, income);
        attribute_satisfied(&seeker, &c, Attribute::Income, today())
    };

    assert!(!earning("3L"));
    assert!(!earning("400000"));
    assert!(earning("5 lakh"));
    assert!(earning("750000"));
    assert!(earning("10L"));
    assert!(!earning("12L"));
}
