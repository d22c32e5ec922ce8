macro_rules! list {
    ($($pub:vis $module:ident),+) => {
        $(
            $pub mod $module;
            use $module::$module;
        )+

        pub fn list() -> Vec<crate::utils::poise::Command> {
            vec![
                $($module()),+
            ]
        }
    };
}

list! {
    game,
    round
}

trait LogCommands {
    async fn log_command(&self);
}

impl LogCommands for crate::utils::Context<'_> {
    async fn log_command(&self) {
        let channel = self
            .channel_id()
            .name(*self)
            .await
            .map_or("dms".to_string(), |c| format!("#{c}"));
        tracing::info!(
            "@{} ({}): {}",
            self.author().name,
            channel,
            self.invocation_string()
        );
    }
}

/// `1. @user: 42` lines, best first.
fn leaderboard_text(board: &[(poise::serenity_prelude::UserId, u64)]) -> String {
    use poise::serenity_prelude::Mentionable;

    if board.is_empty() {
        return "nobody has scored yet!".to_owned();
    }

    board
        .iter()
        .enumerate()
        .map(|(place, (player, score))| {
            format!("{place}. {player}: {score}", place = place + 1, player = player.mention())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
