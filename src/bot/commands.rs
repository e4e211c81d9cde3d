//! Bracketed chat commands (`[[help]]`, `[[pack status]]`, `[[pack:Core]]`,
//! `[[Jon Snow]]`, `[[Jon Snow:Core]]`).
//!
//! Handles command extraction and priority-ordered dispatch.

use fancy_regex::Regex;
use tracing::{debug, info, warn};

use crate::bot::responses::ResponseBuilder;
use crate::bot::schedule::{format_schedule, parse_schedule, ReleaseSource};
use crate::catalog::{Card, CardCatalog};
use crate::common::error::CommandError;
use crate::common::{OutboundMessage, OutboundQueue, Reply};

/// `[[...]]` with non-empty content that does not start with a period.
const COMMAND_PATTERN: &str = r"\[\[([^.\]].*?)\]\]";

/// More results than this are refused instead of listed.
const MAX_LISTED_MATCHES: usize = 14;

pub const HELP_MESSAGE: &str = "To use me, type commands in double square brackets (i.e. [[...]] ). \
You can type the name of a card to see it (add :<pack code> to pick a printing), \
list a pack with \"pack:<pack code>\", or request the upcoming release statuses with \"Pack Status\"";

const CARD_NOT_FOUND: &str = "Sorry, I can't find that card";
const TOO_MANY_CARDS: &str = "Too many cards were returned, please narrow your search";
const MULTIPLE_CARDS: &str = "Multiple cards were found with that name: \n";
const CARD_DISPLAY_FAILED: &str = "Sorry, I can't display that card";
const NO_RELEASES: &str = "No upcoming releases found";

/// Command handlers, in the order they get a chance to claim a command.
///
/// Card lookup accepts any text, so it must stay last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    PackStatus,
    PackList,
    Help,
    CardLookup,
}

impl Handler {
    pub const PRIORITY: [Handler; 4] = [
        Handler::PackStatus,
        Handler::PackList,
        Handler::Help,
        Handler::CardLookup,
    ];
}

/// What a handler did with a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// The handler claimed the command and produced a reply.
    Matched(Reply),
    /// Not this handler's command; nothing happened.
    NotMatched,
}

/// Finds `[[...]]` commands in message text.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    pattern: Regex,
}

impl CommandExtractor {
    pub fn new() -> Result<Self, CommandError> {
        Ok(Self {
            pattern: Regex::new(COMMAND_PATTERN)?,
        })
    }

    /// Extract every command from `text`, left to right.
    ///
    /// Tokens whose content starts with `.` are skipped.
    pub fn extract(&self, text: &str) -> Result<Vec<String>, CommandError> {
        let text = decode_entities(text);
        let mut commands = Vec::new();
        let mut pos = 0;
        while let Some(captures) = self.pattern.captures_from_pos(&text, pos)? {
            let (Some(token), Some(command)) = (captures.get(0), captures.get(1)) else {
                break;
            };
            commands.push(command.as_str().to_string());
            pos = token.end();
        }
        Ok(commands)
    }
}

/// Undo the HTML escaping Slack applies to message text.
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Routes extracted commands to handlers and queues their replies.
pub struct CommandDispatcher<S> {
    catalog: CardCatalog,
    schedule: S,
    responses: ResponseBuilder,
    extractor: CommandExtractor,
    /// Channel replies are addressed to.
    channel: String,
    /// Collection the release schedule is filtered on.
    root_collection: String,
}

impl<S: ReleaseSource> CommandDispatcher<S> {
    pub fn new(
        catalog: CardCatalog,
        schedule: S,
        responses: ResponseBuilder,
        channel: impl Into<String>,
        root_collection: impl Into<String>,
    ) -> Result<Self, CommandError> {
        Ok(Self {
            catalog,
            schedule,
            responses,
            extractor: CommandExtractor::new()?,
            channel: channel.into(),
            root_collection: root_collection.into(),
        })
    }

    /// Process one chat message, queueing a reply for every command in it.
    ///
    /// Returns the number of replies queued. An error aborts the remaining
    /// commands of the message; replies queued before it stay queued.
    pub async fn handle_message(
        &self,
        text: &str,
        queue: &mut OutboundQueue,
    ) -> Result<usize, CommandError> {
        let mut queued = 0;
        for command in self.extractor.extract(text)? {
            if let Some(reply) = self.dispatch(&command).await? {
                queue.push(OutboundMessage::new(self.channel.clone(), reply));
                queued += 1;
            }
        }
        Ok(queued)
    }

    /// Offer a command to each handler in priority order.
    pub async fn dispatch(&self, command: &str) -> Result<Option<Reply>, CommandError> {
        for handler in Handler::PRIORITY {
            if let HandlerOutcome::Matched(reply) = self.try_handler(handler, command).await? {
                debug!("{:?} handled {:?}", handler, command);
                return Ok(Some(reply));
            }
        }
        Ok(None)
    }

    async fn try_handler(&self, handler: Handler, command: &str) -> Result<HandlerOutcome, CommandError> {
        match handler {
            Handler::PackStatus => self.handle_pack_status(command).await,
            Handler::PackList => self.handle_pack_list(command),
            Handler::Help => Ok(handle_help(command)),
            Handler::CardLookup => Ok(self.handle_card(command)),
        }
    }

    /// `[[pack status]]`: upcoming releases.
    async fn handle_pack_status(&self, command: &str) -> Result<HandlerOutcome, CommandError> {
        if !command.eq_ignore_ascii_case("pack status") {
            return Ok(HandlerOutcome::NotMatched);
        }
        info!("Fetching pack status");

        let page = self.schedule.fetch_page().await?;
        let releases = parse_schedule(&page, &self.root_collection)?;

        let text = if releases.is_empty() {
            NO_RELEASES.to_string()
        } else {
            format_schedule(&releases)
        };
        Ok(HandlerOutcome::Matched(Reply::text(text)))
    }

    /// `[[pack:<code>]]`: every card of a pack grouped by faction.
    fn handle_pack_list(&self, command: &str) -> Result<HandlerOutcome, CommandError> {
        let Some((keyword, pack_code)) = command.split_once(':') else {
            return Ok(HandlerOutcome::NotMatched);
        };
        if !keyword.eq_ignore_ascii_case("pack") {
            return Ok(HandlerOutcome::NotMatched);
        }
        info!("Listing pack {:?}", pack_code);

        let Some(pack_name) = self.catalog.pack_name(pack_code) else {
            warn!("Unknown pack code {:?}", pack_code);
            return Ok(HandlerOutcome::Matched(Reply::text(format!(
                "Sorry, I can't find a pack with code {}",
                pack_code
            ))));
        };

        let cards = self.catalog.find_by_pack(pack_code);
        let attachments = self.responses.build_pack_response(&cards)?;
        Ok(HandlerOutcome::Matched(Reply::with_attachments(
            format!("{} - {}:", pack_code, pack_name),
            attachments,
        )))
    }

    /// `[[<name>]]` or `[[<name>:<pack code>]]`. Always matches.
    fn handle_card(&self, command: &str) -> HandlerOutcome {
        let matches = match command.split_once(':') {
            Some((name, pack_code)) => self.catalog.find_by_name_and_pack(name, pack_code),
            None => self.catalog.find_by_name(command),
        };
        HandlerOutcome::Matched(self.card_reply(&matches))
    }

    fn card_reply(&self, matches: &[&Card]) -> Reply {
        match matches {
            [] => Reply::text(CARD_NOT_FOUND),
            [card] => match self.responses.build_card_response(card) {
                Ok(attachments) => Reply::with_attachments("", attachments),
                Err(e) => {
                    warn!("Failed to build card response: {}", e);
                    Reply::text(CARD_DISPLAY_FAILED)
                }
            },
            cards if cards.len() <= MAX_LISTED_MATCHES => {
                let mut text = MULTIPLE_CARDS.to_string();
                for card in cards {
                    text.push_str(&format!("\n{} - {}", card.name, card.pack_code));
                }
                Reply::text(text)
            }
            _ => Reply::text(TOO_MANY_CARDS),
        }
    }
}

/// `[[help]]`: usage text.
fn handle_help(command: &str) -> HandlerOutcome {
    if command.eq_ignore_ascii_case("help") {
        HandlerOutcome::Matched(Reply::text(HELP_MESSAGE))
    } else {
        HandlerOutcome::NotMatched
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::catalog::fixtures::card;
    use crate::catalog::Faction;
    use crate::common::error::ScheduleError;

    const AGOT: &str = "A Game of Thrones: The Card Game Second Edition";

    /// Release page served from memory, counting fetches.
    pub(crate) struct StaticSchedule {
        page: Option<String>,
        pub fetches: Cell<usize>,
    }

    impl StaticSchedule {
        pub fn new(page: Option<&str>) -> Self {
            Self {
                page: page.map(str::to_string),
                fetches: Cell::new(0),
            }
        }
    }

    impl ReleaseSource for StaticSchedule {
        async fn fetch_page(&self) -> Result<String, ScheduleError> {
            self.fetches.set(self.fetches.get() + 1);
            self.page.clone().ok_or(ScheduleError::MarkerNotFound)
        }
    }

    pub(crate) fn sample_catalog() -> CardCatalog {
        let mut cards = vec![
            card("Jon Snow", "thenightswatch", "character", "Core"),
            card("Jon Snow", "thenightswatch", "character", "KotN"),
            card("Jon Arryn", "neutral", "character", "TTB"),
            card("Winterfell", "stark", "location", "Core"),
            card("Ser Pounce", "kittens", "character", "TKP"),
        ];
        // Twenty "Lannisport" cards to trigger the flood guard
        for i in 0..20 {
            cards.push(card(&format!("Lannisport Merchant {}", i), "lannister", "character", "LoCR"));
        }
        CardCatalog::from_cards(cards)
    }

    pub(crate) fn dispatcher_with(page: Option<&str>) -> CommandDispatcher<StaticSchedule> {
        CommandDispatcher::new(
            sample_catalog(),
            StaticSchedule::new(page),
            ResponseBuilder::new("https://thronesdb.com"),
            "thrones",
            AGOT,
        )
        .unwrap()
    }

    fn dispatcher() -> CommandDispatcher<StaticSchedule> {
        dispatcher_with(None)
    }

    async fn reply_to(dispatcher: &CommandDispatcher<StaticSchedule>, command: &str) -> Reply {
        dispatcher.dispatch(command).await.unwrap().unwrap()
    }

    #[test]
    fn test_extract_multiple_commands_in_order() {
        let extractor = CommandExtractor::new().unwrap();
        let commands = extractor
            .extract("compare [[Jon Snow]] and [[Winterfell:Core]] please")
            .unwrap();
        assert_eq!(commands, vec!["Jon Snow", "Winterfell:Core"]);
    }

    #[test]
    fn test_extract_skips_period_prefixed() {
        let extractor = CommandExtractor::new().unwrap();
        assert!(extractor.extract("[[...]]").unwrap().is_empty());
        assert!(extractor.extract("[[.Jon Snow]]").unwrap().is_empty());
        assert_eq!(
            extractor.extract("[[.quiet]] [[loud]]").unwrap(),
            vec!["loud"]
        );
    }

    #[test]
    fn test_extract_ignores_empty_and_plain_text() {
        let extractor = CommandExtractor::new().unwrap();
        assert!(extractor.extract("[[]]").unwrap().is_empty());
        // A command never starts with a closing bracket
        assert!(extractor.extract("[[]]]").unwrap().is_empty());
        assert!(extractor.extract("just chatting [about] cards").unwrap().is_empty());
    }

    #[test]
    fn test_extract_decodes_entities() {
        let extractor = CommandExtractor::new().unwrap();
        assert_eq!(
            extractor.extract("[[Bran &amp; Rickon]]").unwrap(),
            vec!["Bran & Rickon"]
        );
    }

    #[test]
    fn test_handler_priority_order() {
        assert_eq!(Handler::PRIORITY.last(), Some(&Handler::CardLookup));
        assert_eq!(Handler::PRIORITY[0], Handler::PackStatus);
    }

    #[tokio::test]
    async fn test_help_message() {
        let dispatcher = dispatcher();
        let mut queue = OutboundQueue::new();

        let queued = dispatcher.handle_message("[[HELP]]", &mut queue).await.unwrap();

        assert_eq!(queued, 1);
        let messages = queue.drain();
        assert_eq!(messages[0].channel, "thrones");
        assert_eq!(messages[0].text, HELP_MESSAGE);
        assert!(messages[0].attachments.is_empty());
    }

    #[tokio::test]
    async fn test_card_not_found() {
        let reply = reply_to(&dispatcher(), "Hodor").await;
        assert_eq!(reply, Reply::text(CARD_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_single_card() {
        let reply = reply_to(&dispatcher(), "winterfell").await;
        assert_eq!(reply.text, "");
        assert_eq!(reply.attachments.len(), 1);
        assert_eq!(reply.attachments[0].color, Faction::Stark.color());
    }

    #[tokio::test]
    async fn test_card_with_pack_code() {
        let dispatcher = dispatcher();
        let mut queue = OutboundQueue::new();

        dispatcher.handle_message("[[Jon Snow:KOTN]]", &mut queue).await.unwrap();

        let messages = queue.drain();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].attachments.len(), 1);
        assert_eq!(messages[0].attachments[0].color, Faction::NightsWatch.color());
    }

    #[tokio::test]
    async fn test_multiple_cards_listed() {
        let reply = reply_to(&dispatcher(), "jon").await;
        assert_eq!(
            reply.text,
            "Multiple cards were found with that name: \n\nJon Snow - Core\nJon Snow - KotN\nJon Arryn - TTB"
        );
    }

    #[tokio::test]
    async fn test_too_many_cards() {
        let reply = reply_to(&dispatcher(), "lannisport").await;
        assert_eq!(reply, Reply::text(TOO_MANY_CARDS));
    }

    #[tokio::test]
    async fn test_fourteen_matches_still_listed() {
        let cards = (0..14)
            .map(|i| card(&format!("Maester {}", i), "neutral", "character", "Core"))
            .collect();
        let dispatcher = CommandDispatcher::new(
            CardCatalog::from_cards(cards),
            StaticSchedule::new(None),
            ResponseBuilder::new("https://thronesdb.com"),
            "thrones",
            AGOT,
        )
        .unwrap();

        let reply = reply_to(&dispatcher, "maester").await;
        assert!(reply.text.starts_with(MULTIPLE_CARDS));
        assert_eq!(reply.text.lines().count(), 16);
    }

    #[tokio::test]
    async fn test_unknown_faction_card_apologises() {
        let reply = reply_to(&dispatcher(), "Ser Pounce").await;
        assert_eq!(reply, Reply::text(CARD_DISPLAY_FAILED));
    }

    #[tokio::test]
    async fn test_pack_list() {
        let reply = reply_to(&dispatcher(), "Pack:core").await;
        assert_eq!(reply.text, "core - Core pack:");
        assert_eq!(reply.attachments.len(), 9);
        let fields: usize = reply.attachments.iter().map(|a| a.fields.len()).sum();
        assert_eq!(fields, 2);
    }

    #[tokio::test]
    async fn test_unknown_pack_fails_gracefully() {
        let dispatcher = dispatcher();
        let mut queue = OutboundQueue::new();

        let queued = dispatcher.handle_message("[[pack:VFQ]]", &mut queue).await.unwrap();

        assert_eq!(queued, 1);
        assert_eq!(queue.drain()[0].text, "Sorry, I can't find a pack with code VFQ");
    }

    #[tokio::test]
    async fn test_pack_list_with_unknown_faction_errors() {
        let err = dispatcher().dispatch("pack:TKP").await.unwrap_err();
        assert!(matches!(err, CommandError::Response(_)));
    }

    #[tokio::test]
    async fn test_pack_status() {
        let page = format!(
            r#"upcoming_data = [{{"product": "The Shadow City", "name": "Shipping Now", "root_collection": "{}"}}];"#,
            AGOT
        );
        let dispatcher = dispatcher_with(Some(&page));

        let reply = reply_to(&dispatcher, "Pack Status").await;
        assert_eq!(reply, Reply::text("The Shadow City  -  Shipping Now\n"));

        // Every invocation re-fetches
        reply_to(&dispatcher, "pack status").await;
        assert_eq!(dispatcher.schedule.fetches.get(), 2);
    }

    #[tokio::test]
    async fn test_pack_status_without_releases() {
        let dispatcher = dispatcher_with(Some("upcoming_data = [];"));
        let reply = reply_to(&dispatcher, "pack status").await;
        assert_eq!(reply, Reply::text(NO_RELEASES));
    }

    #[tokio::test]
    async fn test_schedule_failure_keeps_earlier_replies() {
        let dispatcher = dispatcher();
        let mut queue = OutboundQueue::new();

        let result = dispatcher
            .handle_message("[[help]] [[pack status]] [[Winterfell]]", &mut queue)
            .await;

        assert!(matches!(result, Err(CommandError::Schedule(_))));
        let messages = queue.drain();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, HELP_MESSAGE);
    }

    #[tokio::test]
    async fn test_no_commands_queues_nothing() {
        let dispatcher = dispatcher();
        let mut queue = OutboundQueue::new();

        let queued =
            tokio_test::assert_ok!(dispatcher.handle_message("[[.Jon Snow]] is great", &mut queue).await);

        assert_eq!(queued, 0);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_pack_keyword_needs_colon() {
        // "pack" alone falls through to card lookup
        let reply = reply_to(&dispatcher(), "pack").await;
        assert_eq!(reply, Reply::text(CARD_NOT_FOUND));
    }
}
