// src/services/failures.rs

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rand::seq::SliceRandom;
use serde::Serialize;

use crate::models::attempt::Attempt;
use crate::models::question::{Question, QuestionCode};
use crate::models::review::{ReviewQuestion, TestFailures};
use crate::models::test::{compare_test_ids, display_name};
use crate::store::{QuestionStore, StoreError};

/// Test id -> distinct failed question codes.
pub type FailureSet = BTreeMap<String, BTreeSet<QuestionCode>>;

/// Collects the failed codes of every attempt into one deduplicated set per
/// test. Attempts without a test id are skipped. The result does not depend
/// on the order of `attempts`.
pub fn consolidate<'a, I>(attempts: I) -> FailureSet
where
    I: IntoIterator<Item = &'a Attempt>,
{
    let mut set = FailureSet::new();
    for attempt in attempts {
        if attempt.test_id.trim().is_empty() {
            continue;
        }
        let codes = set.entry(attempt.test_id.clone()).or_default();
        codes.extend(attempt.failed.iter().filter(|c| !c.is_empty()).cloned());
    }
    set.retain(|_, codes| !codes.is_empty());
    set
}

/// Where a failed code is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// The question subcollection of the test the failure belongs to.
    TestCollection,
    /// The global question collection.
    GlobalCollection,
}

/// Ordered lookup strategies; the first hit wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionPolicy(Vec<ResolveStrategy>);

impl ResolutionPolicy {
    pub fn new(strategies: Vec<ResolveStrategy>) -> Self {
        Self(strategies)
    }

    pub fn strategies(&self) -> &[ResolveStrategy] {
        &self.0
    }
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self(vec![
            ResolveStrategy::TestCollection,
            ResolveStrategy::GlobalCollection,
        ])
    }
}

/// Result of a failure query. `NoFailures` means the user has nothing
/// recorded, which is not the same as failures that could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum FailureReview<T> {
    NoFailures,
    Found(T),
}

pub struct FailureAggregator<'a> {
    questions: &'a dyn QuestionStore,
    policy: ResolutionPolicy,
}

impl<'a> FailureAggregator<'a> {
    pub fn new(questions: &'a dyn QuestionStore) -> Self {
        Self {
            questions,
            policy: ResolutionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolves one failed code of `test_id` to its question document.
    ///
    /// Every strategy tries the code as given and then its integer form.
    /// `Ok(None)` is a resolution miss; store errors are returned as is.
    pub async fn resolve(
        &self,
        test_id: &str,
        code: &QuestionCode,
    ) -> Result<Option<Question>, StoreError> {
        let variants = code.lookup_variants();
        for strategy in self.policy.strategies() {
            for variant in &variants {
                let hit = match strategy {
                    ResolveStrategy::TestCollection => {
                        self.questions.find_test_question(test_id, variant).await?
                    }
                    ResolveStrategy::GlobalCollection => {
                        self.questions.find_global_question(variant).await?
                    }
                };
                if hit.is_some() {
                    return Ok(hit);
                }
            }
        }

        tracing::warn!(test_id, code = %code, "Failed question could not be resolved");
        Ok(None)
    }

    async fn resolve_group(
        &self,
        test_id: &str,
        test_description: &str,
        codes: &BTreeSet<QuestionCode>,
    ) -> Result<Vec<ReviewQuestion>, StoreError> {
        let mut resolved = Vec::with_capacity(codes.len());
        for code in codes {
            if let Some(question) = self.resolve(test_id, code).await? {
                resolved.push(ReviewQuestion::new(
                    test_id,
                    test_description,
                    code.clone(),
                    question,
                ));
            }
        }
        Ok(resolved)
    }

    /// Failures grouped per test, ordered by numeric test id. Groups whose
    /// codes all missed are left out.
    pub async fn per_test(
        &self,
        attempts: &[Attempt],
    ) -> Result<FailureReview<Vec<TestFailures>>, StoreError> {
        let failures = consolidate(attempts);
        if failures.is_empty() {
            return Ok(FailureReview::NoFailures);
        }

        let mut test_ids: Vec<&String> = failures.keys().collect();
        test_ids.sort_by(|a, b| compare_test_ids(a, b));

        let mut groups = Vec::with_capacity(test_ids.len());
        for test_id in test_ids {
            let test = self.questions.get_test(test_id).await?;
            let description = display_name(
                test_id,
                test.as_ref().and_then(|t| t.description.as_deref()),
            );
            let questions = self
                .resolve_group(test_id, &description, &failures[test_id])
                .await?;
            if !questions.is_empty() {
                groups.push(TestFailures {
                    test_id: test_id.clone(),
                    test_description: description,
                    questions,
                });
            }
        }

        Ok(FailureReview::Found(groups))
    }

    /// Failures of a single test, in code order.
    pub async fn for_test(
        &self,
        test_id: &str,
        attempts: &[Attempt],
    ) -> Result<FailureReview<TestFailures>, StoreError> {
        let failures = consolidate(attempts.iter().filter(|a| a.test_id == test_id));
        let Some(codes) = failures.get(test_id) else {
            return Ok(FailureReview::NoFailures);
        };

        let test = self.questions.get_test(test_id).await?;
        let description = display_name(
            test_id,
            test.as_ref().and_then(|t| t.description.as_deref()),
        );
        let questions = self.resolve_group(test_id, &description, codes).await?;

        Ok(FailureReview::Found(TestFailures {
            test_id: test_id.to_string(),
            test_description: description,
            questions,
        }))
    }

    /// Every resolved failure across all tests, shuffled on each call.
    pub async fn all_tests(
        &self,
        attempts: &[Attempt],
    ) -> Result<FailureReview<Vec<ReviewQuestion>>, StoreError> {
        let failures = consolidate(attempts);
        if failures.is_empty() {
            return Ok(FailureReview::NoFailures);
        }

        let descriptions: HashMap<String, Option<String>> = self
            .questions
            .list_tests()
            .await?
            .into_iter()
            .map(|t| (t.id, t.description))
            .collect();

        let mut items = Vec::new();
        for (test_id, codes) in &failures {
            let description = display_name(
                test_id,
                descriptions.get(test_id).and_then(|d| d.as_deref()),
            );
            items.extend(self.resolve_group(test_id, &description, codes).await?);
        }

        items.shuffle(&mut rand::rng());
        Ok(FailureReview::Found(items))
    }
}
