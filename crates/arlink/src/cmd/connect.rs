use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use arlink_catalog::Params;
use arlink_client::{connect, ClientError, ConnectConfig};

use crate::cmd::ConnectArgs;
use crate::exit::{client_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS};
use crate::output::{print_property, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run(args: ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let mut config = ConnectConfig::new(args.device);
    config.discovery_port = args.discovery_port;
    config.controller_name = args.name.clone();

    let mut conn = connect(&config).map_err(|err| client_error("connect", err))?;
    let properties = conn.subscribe_properties();

    if args.all_states {
        conn.send_command("common.Common.AllStates", Params::new())
            .map_err(|err| client_error("all-states", err))?;
        conn.send_command("common.Settings.AllSettings", Params::new())
            .map_err(|err| client_error("all-settings", err))?;
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler: {err}")))?;

    let mut printed = 0usize;
    while conn.is_open() {
        if interrupted.load(Ordering::SeqCst) {
            info!("interrupted, closing");
            conn.close();
            break;
        }

        match conn.poll(POLL_INTERVAL) {
            Ok(_) => {}
            Err(ClientError::ConnectionClosed) => break,
            Err(err) => {
                warn!(%err, "poll failed");
                conn.close();
                return Err(client_error("poll", err));
            }
        }

        while let Ok(change) = properties.try_recv() {
            print_property(&change, format);
            printed += 1;
            if args.count.is_some_and(|count| printed >= count) {
                conn.close();
                return Ok(SUCCESS);
            }
        }
    }

    if interrupted.load(Ordering::SeqCst) {
        Ok(SUCCESS)
    } else {
        // The watchdog closed us: the device went away.
        Err(CliError::new(FAILURE, "connection lost"))
    }
}
