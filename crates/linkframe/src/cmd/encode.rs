use std::fs;

use bytes::BytesMut;
use linkframe_codec::{encode_frame, Control, Fcs16, Fcs32, SEQ_NO_MAX};

use crate::cmd::{EncodeArgs, FcsArg, KindArg};
use crate::exit::{io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::print_raw;

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    if args.seq > SEQ_NO_MAX {
        return Err(CliError::new(
            USAGE,
            format!("sequence number out of range: {} (max {SEQ_NO_MAX})", args.seq),
        ));
    }

    let control = match args.kind {
        KindArg::Data => Control::data(args.seq),
        KindArg::Ack => Control::ack(args.seq),
        KindArg::Nack => Control::nack(args.seq),
    };

    let payload = resolve_payload(&args)?;
    if !payload.is_empty() && args.kind != KindArg::Data {
        return Err(CliError::new(
            USAGE,
            "only data frames carry a payload",
        ));
    }

    let mut buf = BytesMut::new();
    match args.fcs {
        FcsArg::Fcs16 => encode_frame::<Fcs16>(control, &payload, &mut buf),
        FcsArg::Fcs32 => encode_frame::<Fcs32>(control, &payload, &mut buf),
    }

    if args.hex {
        println!("{}", to_hex(&buf));
    } else {
        print_raw(&buf);
    }

    Ok(SUCCESS)
}

fn resolve_payload(args: &EncodeArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Vec::new())
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
