// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use dojo_core::Date;
use dojo_core::Fallible;
use dojo_core::Vault;
use dojo_core::topics::rebuild_all;
use dojo_core::write_dashboard;

pub fn reindex(vault: &Vault) -> Fallible<()> {
    let written = rebuild_all(vault)?;
    println!("Rebuilt {} topic indexes.", written.len());
    Ok(())
}

pub fn update_dashboard(vault: &Vault, today: Date) -> Fallible<()> {
    let path = write_dashboard(vault, today)?;
    println!("Dashboard written to {}", path.display());
    Ok(())
}
