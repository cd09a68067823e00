//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver, then use helpers
//! like [`expect_get`] or [`expect_put`] to answer requests by hand. For
//! scripted sequences, [`MockClient`] replays a queue of canned responses.

use crate::framework::{ActorEntity, FrameworkError, ResourceClient, ResourceRequest, Response, Versioned};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A canned response for the next request of a given kind.
enum Expectation<T: ActorEntity> {
    Get(Result<Option<Versioned<T>>, FrameworkError>),
    Insert(Result<Versioned<T>, FrameworkError>),
    Put(Result<Versioned<T>, FrameworkError>),
    Query(Result<Vec<Versioned<T>>, FrameworkError>),
    Action(Result<(T::ActionResult, Versioned<T>), FrameworkError>),
}

impl<T: ActorEntity> Expectation<T> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Get(_) => "Get",
            Self::Insert(_) => "Insert",
            Self::Put(_) => "Put",
            Self::Query(_) => "Query",
            Self::Action(_) => "Action",
        }
    }
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock client with expectation tracking for fluent testing.
///
/// Requests are matched strictly in order. A request that does not match the
/// kind of the next expectation panics the background task, which surfaces in
/// the test as `ActorDropped`.
///
/// # Example
/// ```ignore
/// let mock = MockClient::<Cart>::new();
/// mock.expect_get().return_ok(Some(Versioned { version: 3, record: cart.clone() }));
/// mock.expect_put().return_err(FrameworkError::VersionConflict { id, expected: 3, actual: 4 });
///
/// let client = mock.client();
/// // Use client in tests...
/// mock.verify(); // Ensures all expectations were met
/// ```
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Queue<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let expectations_clone = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = expectations_clone
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop_front();

                match (request, expectation) {
                    (ResourceRequest::Get { respond_to, .. }, Some(Expectation::Get(response))) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Insert { respond_to, .. }, Some(Expectation::Insert(response))) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Put { respond_to, .. }, Some(Expectation::Put(response))) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Query { respond_to, .. }, Some(Expectation::Query(response))) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Action { respond_to, .. }, Some(Expectation::Action(response))) => {
                        let _ = respond_to.send(response);
                    }
                    (request, expectation) => {
                        panic!(
                            "Unexpected {} request, expected {}",
                            request.kind(),
                            expectation.as_ref().map_or("nothing", Expectation::kind)
                        );
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    pub fn expect_get(&self) -> ExpectationBuilder<T, Option<Versioned<T>>> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Get)
    }

    pub fn expect_insert(&self) -> ExpectationBuilder<T, Versioned<T>> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Insert)
    }

    pub fn expect_put(&self) -> ExpectationBuilder<T, Versioned<T>> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Put)
    }

    pub fn expect_query(&self) -> ExpectationBuilder<T, Vec<Versioned<T>>> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Query)
    }

    pub fn expect_action(&self) -> ExpectationBuilder<T, (T::ActionResult, Versioned<T>)> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Action)
    }

    /// Number of expectations not yet consumed.
    pub fn remaining(&self) -> usize {
        self.expectations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.remaining();
        if remaining != 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder that queues one canned response.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    expectations: Queue<T>,
    wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    fn new(expectations: Queue<T>, wrap: fn(Result<R, FrameworkError>) -> Expectation<T>) -> Self {
        Self { expectations, wrap }
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, FrameworkError>) {
        self.expectations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back((self.wrap)(response));
    }
}

// =============================================================================
// RECEIVER HELPERS
// =============================================================================

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// When testing the *client* logic (e.g. the cart retry loop), there is no
/// need to spin up a full `ResourceActor`. The returned client sends messages
/// to a channel the test controls, so the test can inspect each request and
/// answer it with success, failure or delay deterministically.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<Option<Versioned<T>>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Insert request
pub async fn expect_insert<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T, Response<Versioned<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Insert { record, respond_to }) => Some((record, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Put request
pub async fn expect_put<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T, u64, Response<Versioned<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Put {
            record,
            expected_version,
            respond_to,
        }) => Some((record, expected_version, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Response<(T::ActionResult, Versioned<T>)>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Product, StallId};

    fn taco() -> Product {
        Product::new(StallId::new(), "Taco al pastor", 2_500, 40)
    }

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let product = taco();
        let expected_id = product.id;

        let put_task = tokio::spawn(async move { client.put(product, 7).await });

        let (record, expected_version, responder) =
            expect_put(&mut receiver).await.expect("Expected Put request");
        assert_eq!(record.id, expected_id);
        assert_eq!(expected_version, 7);
        responder
            .send(Err(FrameworkError::VersionConflict {
                id: expected_id.to_string(),
                expected: 7,
                actual: 8,
            }))
            .unwrap();

        let result = put_task.await.unwrap();
        assert!(matches!(
            result,
            Err(FrameworkError::VersionConflict { actual: 8, .. })
        ));
    }

    #[tokio::test]
    async fn test_mock_client_with_expectations() {
        let mock = MockClient::<Product>::new();
        let product = taco();

        mock.expect_insert().return_ok(Versioned {
            version: 1,
            record: product.clone(),
        });
        mock.expect_get().return_ok(Some(Versioned {
            version: 1,
            record: product.clone(),
        }));

        let client = mock.client();

        let stored = client.insert(product.clone()).await.unwrap();
        assert_eq!(stored.version, 1);

        let fetched = client.get(product.id).await.unwrap();
        assert_eq!(fetched.unwrap().record.unit_price, 2_500);

        mock.verify();
    }

    #[tokio::test]
    async fn test_mismatched_request_drops_response() {
        let mock = MockClient::<Product>::new();
        mock.expect_query().return_ok(Vec::new());

        let result = mock.client().get(taco().id).await;
        assert!(matches!(result, Err(FrameworkError::ActorDropped)));
    }
}
