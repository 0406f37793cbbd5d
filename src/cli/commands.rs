use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "helpdesk-chat")]
#[command(author, version, about = "IT helpdesk chat backed by a hosted LLM", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Serve the chat page (default)
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question and print the reply
    Ask { question: String },

    /// Chat in the terminal
    Interactive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["helpdesk-chat"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["helpdesk-chat", "serve", "--host", "0.0.0.0", "-p", "9000"])
            .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Serve {
                host: Some("0.0.0.0".to_string()),
                port: Some(9000),
            })
        );
    }

    #[test]
    fn test_ask_requires_question() {
        assert!(Cli::try_parse_from(["helpdesk-chat", "ask"]).is_err());
        let cli = Cli::try_parse_from(["helpdesk-chat", "ask", "Wi-Fi keeps dropping"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Ask {
                question: "Wi-Fi keeps dropping".to_string()
            })
        );
    }
}
