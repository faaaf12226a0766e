//! Declarative classification rules.
//!
//! A rule is a conjunction of predicates over a [`FeatureBundle`]. Two kinds
//! of predicate exist: membership of a single value in an allowed set, and
//! disjointness of a set of values from a forbidden set.
//!
//! Values outside the known vocabularies never match anything. Membership
//! therefore fails closed on them and disjointness passes open.

use std::collections::{BTreeMap, BTreeSet};

use corpus_utils::{Domain, Lexeme, Observed, PhraseDependentPos, Relation, Tense};

/// Any categorical value a rule can mention.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Tag {
    Pos(PhraseDependentPos),
    Relation(Relation),
    Tense(Tense),
    Domain(Domain),
    Lexeme(Lexeme),
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tag::Pos(value) => write!(f, "{value}"),
            Tag::Relation(value) => write!(f, "{value}"),
            Tag::Tense(value) => write!(f, "{value}"),
            Tag::Domain(value) => write!(f, "{value}"),
            Tag::Lexeme(value) => write!(f, "{value}"),
        }
    }
}

impl From<PhraseDependentPos> for Tag {
    fn from(value: PhraseDependentPos) -> Self {
        Tag::Pos(value)
    }
}

impl From<Relation> for Tag {
    fn from(value: Relation) -> Self {
        Tag::Relation(value)
    }
}

impl From<Tense> for Tag {
    fn from(value: Tense) -> Self {
        Tag::Tense(value)
    }
}

impl From<Domain> for Tag {
    fn from(value: Domain) -> Self {
        Tag::Domain(value)
    }
}

impl From<Lexeme> for Tag {
    fn from(value: Lexeme) -> Self {
        Tag::Lexeme(value)
    }
}

/// Where in the context a value was found.
#[derive(
    Clone,
    Copy,
    Debug,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    parse_display::Display,
)]
#[display(style = "snake_case")]
pub enum Slot {
    WordPos,
    PhraseAtomRelation,
    SubphraseRelations,
    VerbTense,
    PrecedingLexeme,
    ClauseDomain,
}

/// Feature values gathered for one node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureBundle {
    values: BTreeMap<Slot, BTreeSet<Observed<Tag>>>,
}

impl FeatureBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the single value of a slot.
    pub fn with_value<T: Into<Tag>>(self, slot: Slot, value: Observed<T>) -> Self {
        self.with_values(slot, [value])
    }

    /// Records a set of values for a slot. An empty set is a valid, recorded
    /// observation.
    pub fn with_values<T: Into<Tag>>(
        mut self,
        slot: Slot,
        values: impl IntoIterator<Item = Observed<T>>,
    ) -> Self {
        self.values
            .entry(slot)
            .or_default()
            .extend(values.into_iter().map(|value| value.map(Into::into)));
        self
    }

    pub fn values(&self, slot: Slot) -> Option<&BTreeSet<Observed<Tag>>> {
        self.values.get(&slot)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// The slot holds exactly one value, and it is in `allowed`.
    Member { slot: Slot, allowed: BTreeSet<Tag> },
    /// No value in the slot is in `forbidden`.
    Disjoint { slot: Slot, forbidden: BTreeSet<Tag> },
}

impl Predicate {
    pub fn member<T: Into<Tag>>(slot: Slot, allowed: impl IntoIterator<Item = T>) -> Self {
        Predicate::Member {
            slot,
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn disjoint<T: Into<Tag>>(slot: Slot, forbidden: impl IntoIterator<Item = T>) -> Self {
        Predicate::Disjoint {
            slot,
            forbidden: forbidden.into_iter().map(Into::into).collect(),
        }
    }

    pub fn slot(&self) -> Slot {
        match self {
            Predicate::Member { slot, .. } | Predicate::Disjoint { slot, .. } => *slot,
        }
    }

    pub fn holds(&self, bundle: &FeatureBundle) -> bool {
        let observed = bundle.values(self.slot());
        match self {
            Predicate::Member { allowed, .. } => {
                let Some(observed) = observed else {
                    return false;
                };
                let mut values = observed.iter();
                match (values.next(), values.next()) {
                    (Some(Observed::Known(tag)), None) => allowed.contains(tag),
                    _ => false,
                }
            }
            Predicate::Disjoint { forbidden, .. } => observed.is_none_or(|observed| {
                observed
                    .iter()
                    .filter_map(Observed::known)
                    .all(|tag| !forbidden.contains(tag))
            }),
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (slot, operator, set) = match self {
            Predicate::Member { slot, allowed } => (slot, "in", allowed),
            Predicate::Disjoint { slot, forbidden } => (slot, "disjoint from", forbidden),
        };
        let set: Vec<String> = set.iter().map(Tag::to_string).collect();
        write!(f, "{slot} {operator} {{{}}}", set.join(", "))
    }
}

/// A named conjunction of predicates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    name: &'static str,
    predicates: Vec<Predicate>,
}

impl Rule {
    pub fn new(name: &'static str, predicates: Vec<Predicate>) -> Self {
        Self { name, predicates }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Predicates are checked in declaration order and the first failure
    /// ends the evaluation.
    pub fn evaluate(&self, bundle: &FeatureBundle) -> bool {
        self.predicates.iter().all(|predicate| predicate.holds(bundle))
    }

    /// Checks every predicate and reports the ones that fail, in declaration
    /// order.
    pub fn explain(&self, bundle: &FeatureBundle) -> Vec<Failure> {
        self.predicates
            .iter()
            .enumerate()
            .filter(|(_, predicate)| !predicate.holds(bundle))
            .map(|(position, predicate)| Failure {
                rule: self.name(),
                position,
                predicate: predicate.clone(),
                observed: bundle
                    .values(predicate.slot())
                    .map(|values| values.iter().cloned().collect())
                    .unwrap_or_default(),
            })
            .collect()
    }
}

pub fn evaluate(rule: &Rule, bundle: &FeatureBundle) -> bool {
    rule.evaluate(bundle)
}

/// A predicate that did not hold, with what was actually observed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub rule: &'static str,
    pub position: usize,
    pub predicate: Predicate,
    pub observed: Vec<Observed<Tag>>,
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let observed: Vec<String> = self.observed.iter().map(Observed::to_string).collect();
        write!(
            f,
            "{}[{}]: expected {}, observed [{}]",
            self.rule,
            self.position,
            self.predicate,
            observed.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relation_rule() -> Rule {
        Rule::new(
            "test",
            vec![
                Predicate::member(Slot::WordPos, [PhraseDependentPos::Substantive]),
                Predicate::disjoint(
                    Slot::SubphraseRelations,
                    [Relation::NomenRectum, Relation::Attributive],
                ),
            ],
        )
    }

    fn substantive() -> FeatureBundle {
        FeatureBundle::new().with_value(
            Slot::WordPos,
            Observed::Known(PhraseDependentPos::Substantive),
        )
    }

    #[test]
    fn test_member_requires_known_allowed_value() {
        let predicate = Predicate::member(Slot::VerbTense, [Tense::Perfect]);

        let perfect =
            FeatureBundle::new().with_value(Slot::VerbTense, Observed::Known(Tense::Perfect));
        let imperfect =
            FeatureBundle::new().with_value(Slot::VerbTense, Observed::Known(Tense::Imperfect));
        let absent = FeatureBundle::new().with_value(Slot::VerbTense, Observed::<Tense>::Absent);

        assert!(predicate.holds(&perfect));
        assert!(!predicate.holds(&imperfect));
        assert!(!predicate.holds(&absent));
        assert!(!predicate.holds(&FeatureBundle::new()));
    }

    #[test]
    fn test_member_fails_closed_on_unrecognized_value() {
        let predicate = Predicate::member(Slot::VerbTense, [Tense::Perfect]);
        let bundle = FeatureBundle::new()
            .with_value(Slot::VerbTense, Observed::<Tense>::Unrecognized("perf?".into()));

        assert!(!predicate.holds(&bundle));
    }

    #[test]
    fn test_member_rejects_ambiguous_slot() {
        let predicate =
            Predicate::member(Slot::ClauseDomain, [Domain::Discourse, Domain::Quotation]);
        let bundle = FeatureBundle::new().with_values(
            Slot::ClauseDomain,
            [Observed::Known(Domain::Discourse), Observed::Known(Domain::Quotation)],
        );

        assert!(!predicate.holds(&bundle));
    }

    #[test]
    fn test_disjoint_passes_open_on_unrecognized_value() {
        let predicate = Predicate::disjoint(Slot::PhraseAtomRelation, [Relation::Apposition]);
        let bundle = FeatureBundle::new().with_value(
            Slot::PhraseAtomRelation,
            Observed::<Relation>::Unrecognized("Pred".into()),
        );

        assert!(predicate.holds(&bundle));
    }

    #[test]
    fn test_disjoint_holds_for_empty_set() {
        let predicate = Predicate::disjoint(Slot::SubphraseRelations, [Relation::Modifier]);
        let bundle = FeatureBundle::new()
            .with_values(Slot::SubphraseRelations, Vec::<Observed<Relation>>::new());

        assert!(predicate.holds(&bundle));
        assert!(predicate.holds(&FeatureBundle::new()));
    }

    #[test]
    fn test_disjoint_fails_on_any_forbidden_value() {
        let bundle = substantive().with_values(
            Slot::SubphraseRelations,
            [
                Observed::Known(Relation::NotApplicable),
                Observed::Known(Relation::Attributive),
            ],
        );

        assert!(!relation_rule().evaluate(&bundle));
    }

    #[test]
    fn test_rule_is_a_conjunction() {
        let rule = relation_rule();
        let clean = substantive().with_values(
            Slot::SubphraseRelations,
            [Observed::Known(Relation::NotApplicable)],
        );
        let verb = FeatureBundle::new()
            .with_value(Slot::WordPos, Observed::Known(PhraseDependentPos::Verb));

        assert!(rule.evaluate(&clean));
        assert!(evaluate(&rule, &clean));
        assert!(!rule.evaluate(&verb));
    }

    #[test]
    fn test_explain_lists_every_failure_in_order() {
        let bundle = FeatureBundle::new()
            .with_value(Slot::WordPos, Observed::Known(PhraseDependentPos::Verb))
            .with_values(
                Slot::SubphraseRelations,
                [Observed::Known(Relation::NomenRectum)],
            );

        let failures = relation_rule().explain(&bundle);

        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].position, 0);
        assert_eq!(failures[1].position, 1);
        assert_eq!(
            failures[1].to_string(),
            "test[1]: expected subphrase_relations disjoint from {rec, atr}, observed [rec]"
        );
        assert!(relation_rule().explain(&substantive()).is_empty());
    }
}
