//! Client tests against a live users router on an ephemeral port.

use axum::Router;
use domain_users::{InMemoryUserRepository, UserService, handlers};
use tokio::net::TcpListener;
use users_client::*;

async fn spawn_server() -> UsersClient {
    let router = Router::new().nest(
        "/api/v1",
        handlers::router(UserService::new(InMemoryUserRepository::new())),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    UsersClient::new(ClientConfig::new(format!("http://{}", addr))).unwrap()
}

fn admin() -> CreateUser {
    CreateUser {
        username: "admin".to_string(),
        email: "gaga@gaga.com".to_string(),
        name: "gaga".to_string(),
        surname: "gagoso".to_string(),
        hashed_password: "admin".to_string(),
    }
}

#[tokio::test]
async fn test_crud_round_trip() {
    let client = spawn_server().await;

    let created = client.create_user(&admin()).await.unwrap();
    assert_eq!(created.username, "admin");

    let fetched = client.get_user(created.id).await.unwrap();
    assert_eq!(fetched, created);

    let updated = client
        .update_user(
            created.id,
            &UpdateUser {
                surname: Some("rossi".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.surname, "rossi");
    assert_eq!(updated.name, "gaga");

    let listed = client.list_users(ListParams::default()).await.unwrap();
    assert_eq!(listed.len(), 1);

    client
        .change_password(&ChangePassword {
            user_id: created.id,
            old_password: "admin".to_string(),
            new_password: "n3w".to_string(),
        })
        .await
        .unwrap();

    client.delete_user(created.id).await.unwrap();
    let err = client.get_user(created.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_list_paging_parameters_are_sent() {
    let client = spawn_server().await;

    for i in 0..4 {
        client
            .create_user(&CreateUser {
                username: format!("user{}", i),
                email: format!("user{}@example.com", i),
                ..admin()
            })
            .await
            .unwrap();
    }

    let page = client
        .list_users(ListParams {
            limit: 2,
            offset: 3,
        })
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].username, "user3");
}

#[tokio::test]
async fn test_error_carries_server_details() {
    let client = spawn_server().await;
    client.create_user(&admin()).await.unwrap();

    let err = client.create_user(&admin()).await.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(err.status_code, Some(409));
    assert!(err.url.as_deref().unwrap().ends_with("/api/v1/users/"));
    assert!(!err.server_message.is_empty());

    let err = client.get_user(99).await.unwrap_err();
    assert_eq!(err.server_message, "User 99 not found");
}

#[tokio::test]
async fn test_wrong_old_password_is_bad_request() {
    let client = spawn_server().await;
    let created = client.create_user(&admin()).await.unwrap();

    let err = client
        .change_password(&ChangePassword {
            user_id: created.id,
            old_password: "nope".to_string(),
            new_password: "n3w".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status_code, Some(400));
}

#[tokio::test]
async fn test_unreachable_server_has_no_status() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = UsersClient::new(ClientConfig::new(format!("http://{}", addr))).unwrap();
    let err = client.get_user(1).await.unwrap_err();
    assert_eq!(err.status_code, None);
    assert!(err.url.is_some());
}
