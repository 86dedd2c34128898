mod test_utils;

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use docqa::api::public::ask::DUMMY_ANSWER;
    use docqa::ask::{AUTH_ERROR_MESSAGE, AskClient, AskError, GENERIC_ERROR_MESSAGE};
    use docqa::chat::{AskOutcome, Conversation, LifecycleState, TranscriptUpdate};
    use docqa::view::{CitationTable, Document, HighlightSink, Segment, render_citations};

    use crate::test_utils::{SERVER_TOKEN, spawn_app, test_config};

    #[tokio::test]
    async fn it_streams_an_answer_from_the_stub_server() {
        let url = spawn_app(test_config(Some(SERVER_TOKEN))).await;
        let client = AskClient::new(&url).bearer_token(SERVER_TOKEN);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut conversation = Conversation::builder(client).updates(tx).build();

        let outcome = conversation
            .ask("What does sunlight do?", vec!["Sunlight helps".to_string()])
            .await
            .unwrap();
        assert!(matches!(outcome, AskOutcome::Completed));
        assert_eq!(conversation.state(), LifecycleState::Idle);

        let messages = conversation.transcript().messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_user);
        assert_eq!(messages[1].content, DUMMY_ANSWER);
        assert_eq!(
            messages[1].retrieved_snippets,
            vec!["Sunlight helps".to_string()]
        );

        // The question, the opened answer, then one extension per
        // remaining token
        let mut updates = Vec::new();
        while let Ok(update) = rx.try_recv() {
            updates.push(update);
        }
        assert!(matches!(&updates[0], TranscriptUpdate::Appended { index: 0, .. }));
        assert!(matches!(&updates[1], TranscriptUpdate::Appended { index: 1, .. }));
        assert!(
            updates[2..]
                .iter()
                .all(|u| matches!(u, TranscriptUpdate::Extended { index: 1, .. }))
        );

        // The citation in the answer resolves to the streamed snippet
        let segments = render_citations(&messages[1].content, &messages[1].citation_table());
        assert!(segments.contains(&Segment::Citation {
            number: 1,
            snippet: "Sunlight helps".to_string()
        }));
    }

    #[tokio::test]
    async fn it_answers_without_streaming_from_the_stub_server() {
        let url = spawn_app(test_config(None)).await;
        let mut conversation = Conversation::builder(AskClient::new(&url))
            .streaming(false)
            .build();

        let outcome = conversation
            .ask("What do plants need?", Vec::new())
            .await
            .unwrap();
        assert!(matches!(outcome, AskOutcome::Completed));

        let answer = conversation.transcript().last_answer().unwrap();
        assert_eq!(answer.content, DUMMY_ANSWER);

        let table = answer.citation_table();
        assert!(matches!(table, CitationTable::ById(_)));

        let mut document = Document::default();
        document.highlight(table.lookup(1).unwrap());
        assert_eq!(document.highlighted(), vec![0]);
    }

    #[tokio::test]
    async fn it_shows_the_auth_message_when_rejected() {
        let url = spawn_app(test_config(Some(SERVER_TOKEN))).await;
        let mut conversation = Conversation::builder(AskClient::new(&url)).build();

        let outcome = conversation
            .ask("What does sunlight do?", Vec::new())
            .await
            .unwrap();
        assert!(matches!(outcome, AskOutcome::Failed(AskError::Unauthorized)));

        let answer = conversation.transcript().last().unwrap();
        assert!(!answer.is_user);
        assert_eq!(answer.content, AUTH_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn it_assembles_the_sunlight_answer() {
        let mut server = mockito::Server::new_async().await;

        let sse_response = concat!(
            "data: {\"type\":\"context\",\"top_docs\":[\"Sunlight helps...\"]}\n\n",
            "data: {\"type\":\"token\",\"answer\":\"Sun\"}\n\n",
            "data: {\"type\":\"token\",\"answer\":\"light helps plants.\"}\n\n",
        );
        let mock = server
            .mock("POST", "/ask")
            .match_header("accept", "text/event-stream")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(sse_response)
            .create();

        let mut conversation = Conversation::builder(AskClient::new(&server.url())).build();
        let outcome = conversation
            .ask("What does sunlight do?", Vec::new())
            .await
            .unwrap();

        mock.assert();
        assert!(matches!(outcome, AskOutcome::Completed));

        let messages = conversation.transcript().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "What does sunlight do?");
        assert_eq!(messages[1].content, "Sunlight helps plants.");
        assert_eq!(
            messages[1].retrieved_snippets,
            vec!["Sunlight helps...".to_string()]
        );
    }

    #[tokio::test]
    async fn it_shows_the_generic_message_on_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("POST", "/ask").with_status(503).create();

        let mut conversation = Conversation::builder(AskClient::new(&server.url())).build();
        let outcome = conversation
            .ask("What does sunlight do?", Vec::new())
            .await
            .unwrap();

        assert!(matches!(outcome, AskOutcome::Failed(AskError::Status(_))));
        assert_eq!(
            conversation.transcript().last().unwrap().content,
            GENERIC_ERROR_MESSAGE
        );
    }
}
