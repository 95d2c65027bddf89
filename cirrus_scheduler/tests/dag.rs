mod common;

use ::std::time::Duration;

use ::cirrus_common::{
    error::*,
    executor::{ExecutorLocation, PinResponse},
    serde_json::json,
    tokio,
};
use ::cirrus_scheduler::executor::{PinAcceptor, PinSender};
use ::mockall::predicate;
use common::{get_test_server, register_executors, MockExecutors, MockKvs, PIN_TIMEOUT};
use http::StatusCode;

fn loc(node: &str) -> ExecutorLocation {
    ExecutorLocation::new(node, 0)
}

fn accepting_kvs() -> MockKvs {
    let mut kvs = MockKvs::new();
    kvs.expect_put().returning(|_, _| Ok(()));
    kvs
}

/// Executors that accept every pin right away.
fn accepting_executors(sender: PinSender) -> MockExecutors {
    let mut executors = MockExecutors::new();
    executors
        .expect_send_pin()
        .withf(|_, message| message.starts_with("127.0.0.1:"))
        .returning(move |location, _| {
            sender
                .try_send(PinResponse::accepted(location.clone()))
                .unwrap();
            Ok(())
        });
    executors
}

#[tokio::test]
async fn get_dag_not_found() -> Result<()> {
    let (sender, acceptor) = PinAcceptor::channel();
    let server = get_test_server(
        MockKvs::new(),
        MockExecutors::new(),
        sender,
        acceptor,
        PIN_TIMEOUT,
    )
    .await?;

    let response = server.get("/dag/d1").await;

    response.assert_status_not_found();
    assert!(response.text().contains("DAG d1 not found"));
    Ok(())
}

#[tokio::test]
async fn create_dag_with_zero_replicas() -> Result<()> {
    let (sender, acceptor) = PinAcceptor::channel();
    let server = get_test_server(
        MockKvs::new(),
        MockExecutors::new(),
        sender,
        acceptor,
        PIN_TIMEOUT,
    )
    .await?;

    let response = server
        .post("/dag")
        .json(&json!({
            "name": "d1",
            "functions": ["f1"],
            "num_replicas": 0
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn create_dag_with_unknown_connection() -> Result<()> {
    let (sender, acceptor) = PinAcceptor::channel();
    let server = get_test_server(
        MockKvs::new(),
        MockExecutors::new(),
        sender,
        acceptor,
        PIN_TIMEOUT,
    )
    .await?;

    let response = server
        .post("/dag")
        .json(&json!({
            "name": "d1",
            "functions": ["f1"],
            "connections": [{"source": "f1", "sink": "f2"}]
        }))
        .await;

    response.assert_status_bad_request();
    Ok(())
}

#[tokio::test]
async fn create_dag_named_like_function_list() -> Result<()> {
    let (sender, acceptor) = PinAcceptor::channel();
    let server = get_test_server(
        MockKvs::new(),
        MockExecutors::new(),
        sender,
        acceptor,
        PIN_TIMEOUT,
    )
    .await?;

    let response = server
        .post("/dag")
        .json(&json!({
            "name": "funcs/index-allfuncs",
            "functions": ["f1"]
        }))
        .await;

    response.assert_status_bad_request();
    Ok(())
}

#[tokio::test]
async fn create_and_get_dag() -> Result<()> {
    let (sender, acceptor) = PinAcceptor::channel();
    let executors = accepting_executors(sender.clone());
    let server = get_test_server(accepting_kvs(), executors, sender, acceptor, PIN_TIMEOUT).await?;
    register_executors(&server, &[loc("a"), loc("b")]).await;

    let response = server
        .post("/dag")
        .json(&json!({
            "name": "d1",
            "functions": ["f1", "f2"],
            "connections": [{"source": "f1", "sink": "f2"}]
        }))
        .await;
    response.assert_status_ok();

    let response = server.get("/dag/d1").await;
    response.assert_status_ok();
    response.assert_json(&json!({
        "dag": {
            "name": "d1",
            "functions": ["f1", "f2"],
            "connections": [{"source": "f1", "sink": "f2"}]
        },
        "sources": ["f1"]
    }));

    // default replication of the test scheduler is 2
    for function in ["f1", "f2"] {
        let response = server.get(&format!("/function/{}", function)).await;
        response.assert_status_ok();
        response.assert_json(&json!({
            "locations": [{"node": "a", "slot": 0}, {"node": "b", "slot": 0}],
            "call_frequency": 0
        }));
    }

    let response = server.post("/function/f1/call").await;
    response.assert_status_ok();
    response.assert_json(&json!(1));

    server.get("/dag").await.assert_json(&json!(["d1"]));
    Ok(())
}

#[tokio::test]
async fn create_existing_dag() -> Result<()> {
    let (sender, acceptor) = PinAcceptor::channel();
    let executors = accepting_executors(sender.clone());
    let server = get_test_server(accepting_kvs(), executors, sender, acceptor, PIN_TIMEOUT).await?;
    register_executors(&server, &[loc("a")]).await;
    let body = json!({
        "name": "d1",
        "functions": ["f1"],
        "num_replicas": 1
    });

    server.post("/dag").json(&body).await.assert_status_ok();
    let response = server.post("/dag").json(&body).await;

    response.assert_status(StatusCode::CONFLICT);
    assert!(response.text().contains("DAG already exists"));
    Ok(())
}

#[tokio::test]
async fn create_dag_without_executors() -> Result<()> {
    let (sender, acceptor) = PinAcceptor::channel();
    let server = get_test_server(
        accepting_kvs(),
        MockExecutors::new(),
        sender,
        acceptor,
        PIN_TIMEOUT,
    )
    .await?;

    let response = server
        .post("/dag")
        .json(&json!({
            "name": "d1",
            "functions": ["f1"]
        }))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    server.get("/dag/d1").await.assert_status_not_found();
    Ok(())
}

#[tokio::test]
async fn failed_dag_is_rolled_back() -> Result<()> {
    let (sender, acceptor) = PinAcceptor::channel();
    let mut executors = MockExecutors::new();
    let replies = sender.clone();
    executors
        .expect_send_pin()
        .returning(move |location, message| {
            let response = if location.node == "b" && message.ends_with(":f2") {
                PinResponse::rejected(location.clone())
            } else {
                PinResponse::accepted(location.clone())
            };
            replies.try_send(response).unwrap();
            Ok(())
        });
    executors
        .expect_send_unpin()
        .with(predicate::eq(loc("a")), predicate::eq("f1"))
        .times(1)
        .returning(|_, _| ());
    executors
        .expect_send_unpin()
        .with(predicate::eq(loc("b")), predicate::eq("f1"))
        .times(1)
        .returning(|_, _| ());
    executors
        .expect_send_unpin()
        .with(predicate::eq(loc("a")), predicate::eq("f2"))
        .times(1)
        .returning(|_, _| ());
    let server = get_test_server(accepting_kvs(), executors, sender, acceptor, PIN_TIMEOUT).await?;
    register_executors(&server, &[loc("a"), loc("b")]).await;

    let response = server
        .post("/dag")
        .json(&json!({
            "name": "d1",
            "functions": ["f1", "f2"]
        }))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    server.get("/dag/d1").await.assert_status_not_found();
    server.get("/function/f1").await.assert_status_not_found();
    server
        .get("/executor")
        .await
        .assert_json(&json!([{"node": "a", "slot": 0}, {"node": "b", "slot": 0}]));
    Ok(())
}

#[tokio::test]
async fn delete_dag_not_found() -> Result<()> {
    let (sender, acceptor) = PinAcceptor::channel();
    let server = get_test_server(
        MockKvs::new(),
        MockExecutors::new(),
        sender,
        acceptor,
        PIN_TIMEOUT,
    )
    .await?;

    let response = server.delete("/dag/d1").await;

    response.assert_status_not_found();
    Ok(())
}

#[tokio::test]
async fn delete_dag() -> Result<()> {
    let (sender, acceptor) = PinAcceptor::channel();
    let mut executors = accepting_executors(sender.clone());
    executors
        .expect_send_unpin()
        .with(predicate::always(), predicate::eq("f1"))
        .times(2)
        .returning(|_, _| ());
    let server = get_test_server(accepting_kvs(), executors, sender, acceptor, PIN_TIMEOUT).await?;
    register_executors(&server, &[loc("a"), loc("b")]).await;
    server
        .post("/dag")
        .json(&json!({
            "name": "d1",
            "functions": ["f1"]
        }))
        .await
        .assert_status_ok();

    let response = server.delete("/dag/d1").await;

    response.assert_status_ok();
    server.get("/dag/d1").await.assert_status_not_found();
    server.get("/function/f1").await.assert_status_not_found();
    server.get("/executor").await.assert_json(&json!([]));
    Ok(())
}

#[tokio::test]
async fn pin_reply_through_pin_accept() -> Result<()> {
    let (sender, acceptor) = PinAcceptor::channel();
    let mut executors = MockExecutors::new();
    executors
        .expect_send_pin()
        .with(predicate::eq(loc("a")), predicate::eq("127.0.0.1:f1".to_owned()))
        .times(1)
        .returning(|_, _| Ok(()));
    let server = get_test_server(
        accepting_kvs(),
        executors,
        sender,
        acceptor,
        Duration::from_secs(5),
    )
    .await?;
    register_executors(&server, &[loc("a")]).await;

    let create = async {
        server
            .post("/dag")
            .json(&json!({
                "name": "d1",
                "functions": ["f1"],
                "num_replicas": 1
            }))
            .await
    };
    let reply = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        server
            .post("/pin_accept")
            .json(&json!({"node": "a", "slot": 0, "success": true}))
            .await
    };
    let (created, replied) = tokio::join!(create, reply);

    replied.assert_status_ok();
    created.assert_status_ok();
    server.get("/function/f1").await.assert_json(&json!({
        "locations": [{"node": "a", "slot": 0}],
        "call_frequency": 0
    }));
    Ok(())
}
