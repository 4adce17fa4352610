use std::fs;
use std::io::Read;

use linkframe_codec::{Checksum, Decoded, Decoder, Fcs16, Fcs32};
use tracing::{debug, warn};

use crate::cmd::{DecodeArgs, FcsArg};
use crate::exit::{codec_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = read_input(&args)?;
    let bytes = if args.hex { parse_hex(&raw)? } else { raw };

    match args.fcs {
        FcsArg::Fcs16 => decode_all::<Fcs16>(&bytes, args.max_payload, format),
        FcsArg::Fcs32 => decode_all::<Fcs32>(&bytes, args.max_payload, format),
    }
}

fn read_input(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    match &args.file {
        Some(path) => fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err)),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|err| io_error("failed reading stdin", err))?;
            Ok(buf)
        }
    }
}

fn decode_all<C: Checksum>(
    bytes: &[u8],
    max_payload: usize,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut decoder = Decoder::<C>::new();
    let mut dest = vec![0u8; max_payload + C::WIDTH];

    let mut offset = 0usize;
    let mut frames = 0usize;
    let mut corrupt = 0usize;

    while offset < bytes.len() {
        match decoder
            .decode(&bytes[offset..], &mut dest)
            .map_err(|err| codec_error("decode failed", err))?
        {
            Decoded::Pending { consumed } => {
                offset += consumed;
                break;
            }
            Decoded::Frame {
                consumed,
                control,
                payload_len,
            } => {
                offset += consumed;
                frames += 1;
                print_frame(control, &dest[..payload_len], format);
            }
            Decoded::Corrupt { discard } => {
                offset += discard;
                corrupt += 1;
                warn!(discarded = discard, "corrupt frame discarded");
            }
        }
    }

    debug!(frames, corrupt, trailing = bytes.len() - offset, "decode finished");

    if corrupt > 0 {
        Ok(DATA_INVALID)
    } else {
        Ok(SUCCESS)
    }
}

/// Parse hex text into bytes. Whitespace is ignored; anything else
/// besides hex digits is rejected.
fn parse_hex(input: &[u8]) -> CliResult<Vec<u8>> {
    let text = std::str::from_utf8(input)
        .map_err(|_| CliError::new(USAGE, "hex input is not valid UTF-8"))?;

    let digits: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(CliError::new(
            USAGE,
            format!("hex input has odd length ({} digits)", digits.len()),
        ));
    }

    let mut out = Vec::with_capacity(digits.len() / 2);
    for pair in digits.chunks(2) {
        let hi = pair[0]
            .to_digit(16)
            .ok_or_else(|| CliError::new(USAGE, format!("invalid hex digit: {}", pair[0])))?;
        let lo = pair[1]
            .to_digit(16)
            .ok_or_else(|| CliError::new(USAGE, format!("invalid hex digit: {}", pair[1])))?;
        out.push(((hi << 4) | lo) as u8);
    }
    Ok(out)
}
