//! Connection liveness check

use crate::protocol::{ClientOpcode, CmdInfo, Header, KeyValueStatus, RequestBody, ResponseBody};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopRequestBody;

impl RequestBody for NoopRequestBody {
    const OPCODE: ClientOpcode = ClientOpcode::Noop;
    type Response = NoopResponseBody;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopResponseBody;

impl ResponseBody for NoopResponseBody {
    const OPCODE: ClientOpcode = ClientOpcode::Noop;

    fn parse(
        &mut self,
        status: KeyValueStatus,
        _header: &Header,
        framing_extras_size: u8,
        key_size: u16,
        extras_size: u8,
        body: &[u8],
        _info: &CmdInfo,
    ) -> bool {
        // Framing extras are allowed; a successful noop carries nothing else.
        !status.is_success()
            || (key_size == 0 && extras_size == 0 && body.len() == framing_extras_size as usize)
    }
}
