// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Model Context Protocol (MCP) server surface.
//!
//! Each lifecycle operation is one tool taking a flat argument record; domain
//! failures are returned as error result data, never thrown across the
//! boundary.

mod server;
mod types;

pub use server::ProteusMcp;
