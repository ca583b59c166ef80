// Talks to the real service. Skipped unless OPENAI_API_KEY was set at build time.

use dotenvy::dotenv;
use openai_assistant::{
    assistants::{
        messages::{CreateMessageRequest, Role},
        threads::CreateThreadRequest,
    },
    client::{ListOrder, ListQuery},
    OpenAiClient,
};

#[tokio::test]
#[cfg_attr(no_key, ignore = "OPENAI_API_KEY is not set")]
async fn thread_keeps_posted_message() {
    dotenv().ok();
    let client = OpenAiClient::from_env().unwrap();

    let thread = client
        .create_thread(CreateThreadRequest::default())
        .await
        .unwrap();
    assert!(thread.id.starts_with("thread_"));

    client
        .create_message(&thread.id, CreateMessageRequest::user("Hello!"))
        .await
        .unwrap();

    let messages = client
        .list_messages(&thread.id, ListQuery::new(ListOrder::Asc))
        .await
        .unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].text(), "Hello!");
}
