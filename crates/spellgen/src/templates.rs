//! Embedded Solidity templates, one per template kind.
//!
//! Tera syntax. `print_address` (registered in `render`) turns a named
//! address into a `toolkit.getAddress("...")` lookup and an unnamed one into
//! its literal checksummed form.

pub const SCRIPT: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.13;

import "utils/BaseScript.sol";

contract {{ script_name }}Script is BaseScript {
    function deploy() public {
        vm.startBroadcast();

        vm.stopBroadcast();
    }
}
"#;

pub const SCRIPT_CAULDRON: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.13;

import "utils/BaseScript.sol";
import "utils/CauldronDeployLib.sol";
import "interfaces/IAggregator.sol";
import "interfaces/IBentoBoxV1.sol";
{% if collateral.type == "ERC4626" %}import "interfaces/IERC4626.sol";
{% endif %}
contract {{ script_name }}Script is BaseScript {
    function deploy() public returns (ICauldronV4 cauldron) {
        IBentoBoxV1 box = IBentoBoxV1(toolkit.getAddress("degenBox"));
        address safe = toolkit.getAddress("safe.ops");
        address collateral = {{ collateral.named_address | print_address }};
        IAggregator aggregator = IAggregator({{ collateral.aggregator_named_address | print_address }});

        vm.startBroadcast();

{% if collateral.type == "ERC4626" %}        ProxyOracle oracle = OracleLib.deployERC4626Oracle("{{ script_name }}", IERC4626(collateral), aggregator);
{% else %}        ProxyOracle oracle = OracleLib.deploySimpleProxyOracle("{{ script_name }}", aggregator, {{ collateral.decimals }});
{% endif %}
        cauldron = CauldronDeployLib.deployCauldronV4(
            "{{ script_name }}",
            box,
            toolkit.getAddress("cauldronV4"),
            IERC20(collateral),
            IOracle(address(oracle)),
            "",
            {{ parameters.ltv.bips }}, // {{ parameters.ltv.percent }}% LTV
            {{ parameters.interests.bips }}, // {{ parameters.interests.percent }}% Interests
            {{ parameters.borrow_fee.bips }}, // {{ parameters.borrow_fee.percent }}% Opening Fee
            {{ parameters.liquidation_fee.bips }} // {{ parameters.liquidation_fee.percent }}% Liquidation Fee
        );

        if (safe != address(0)) {
            oracle.transferOwnership(safe);
        }

        vm.stopBroadcast();
    }
}
"#;

pub const INTERFACE: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity >=0.8.0;

interface {{ interface_name }} {

}
"#;

pub const CONTRACT: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.13;

{% if operatable %}import "mixins/Operatable.sol";

contract {{ contract_name }} is Operatable {

}
{% else %}contract {{ contract_name }} {

}
{% endif %}"#;

pub const CONTRACT_MAGIC_VAULT: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.13;

import "tokens/ERC4626.sol";

contract Magic{{ name }} is ERC4626 {

}
"#;

pub const BLAST_WRAPPED: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.13;

import "interfaces/IBlast.sol";

contract {{ contract_name }} {
    IBlast constant BLAST = IBlast(0x4300000000000000000000000000000000000002);

    constructor(address governor_) {
        BLAST.configureClaimableYield();
        BLAST.configureClaimableGas();
        BLAST.configureGovernor(governor_);
    }
}
"#;

pub const TEST: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.13;

import "utils/BaseTest.sol";
{% if script_name %}import "script/{{ script_name }}.s.sol";
{% endif %}
contract {{ test_name }}Test is BaseTest {
{% for declaration in deploy_variables %}    {{ declaration }};
{% endfor %}
    function setUp() public override {
        fork({{ chain_id_ident }}, {{ block_number }});
        super.setUp();
{% if script_name %}
        {{ script_name }}Script script = new {{ script_name }}Script();
        script.setTesting(true);

{% if deploy_return_values | length == 1 %}        {{ deploy_return_values.0 }} = script.deploy();
{% elif deploy_return_values | length > 1 %}        ({{ deploy_return_values | join(sep=", ") }}) = script.deploy();
{% else %}        script.deploy();
{% endif %}{% endif %}    }
}
"#;

pub const TEST_MULTI: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.13;

import "utils/BaseTest.sol";
{% if script_name %}import "script/{{ script_name }}.s.sol";
{% endif %}
contract {{ test_name }}TestBase is BaseTest {
{% for declaration in deploy_variables %}    {{ declaration }};
{% endfor %}
    function setUp() public virtual override {
        fork({{ chain_id_ident }}, {{ block_number }});
        super.setUp();
{% if script_name %}
        {{ script_name }}Script script = new {{ script_name }}Script();
        script.setTesting(true);

{% if deploy_return_values | length == 1 %}        {{ deploy_return_values.0 }} = script.deploy();
{% elif deploy_return_values | length > 1 %}        ({{ deploy_return_values | join(sep=", ") }}) = script.deploy();
{% else %}        script.deploy();
{% endif %}{% endif %}    }
}

contract {{ test_name }}Test is {{ test_name }}TestBase {
    function setUp() public override {
        super.setUp();
    }
}
"#;
